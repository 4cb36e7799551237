//! Physical, astrodynamic and model constants.
//!
//! Gravity and atmosphere values are the WGS-72 set the SGP4/SDP4 models were
//! fitted with; the Earth radius and flattening used for observer geometry are
//! WGS-84.

// ── Earth model ──

/// Earth equatorial radius (km) (WGS84)
pub const XKMPER: f64 = 6378.137;

/// Earth flattening (WGS84)
pub const FLATTENING: f64 = 3.352_810_664_747_48e-3;

/// Distance units per Earth radius
pub const AE: f64 = 1.0;

/// Earth rotation rate (rad/s)
pub const MFACTOR: f64 = 7.292_115e-5;

/// Earth rotations per sidereal day
pub const OMEGA_E: f64 = 1.002_737_909_34;

// ── SGP4 gravity and drag ──

/// J2 harmonic scaled: 0.5 * J2 * AE²
pub const CK2: f64 = 5.413_079e-4;

/// J4 harmonic scaled: -0.375 * J4 * AE⁴
pub const CK4: f64 = 6.209_887e-7;

/// J3 zonal harmonic
pub const XJ3: f64 = -2.538_81e-6;

/// sqrt(GM) in Earth radii^1.5 per minute
pub const XKE: f64 = 7.436_691_61e-2;

/// (q0 - s)^4 density function parameter (Earth radii^4)
pub const QOMS2T: f64 = 1.880_279e-9;

/// Density function parameter s (Earth radii)
pub const S: f64 = 1.012_229;

/// Two thirds
pub const TOTHRD: f64 = 2.0 / 3.0;

/// Minutes per day
pub const XMNPDA: f64 = 1440.0;

/// Seconds per day
pub const SECDAY: f64 = 86400.0;

/// Period (minutes) at or above which the deep-space model is used
pub const DEEP_SPACE_PERIOD_MINUTES: f64 = 225.0;

// ── Lunar / solar perturbation constants ──

pub const ZNS: f64 = 1.194_59e-5;
pub const C1SS: f64 = 2.986_479_7e-6;
pub const ZES: f64 = 0.016_75;
pub const ZNL: f64 = 1.583_521_8e-4;
pub const C1L: f64 = 4.796_806_5e-7;
pub const ZEL: f64 = 0.054_90;
pub const ZCOSIS: f64 = 0.917_448_67;
pub const ZSINIS: f64 = 0.397_854_16;
pub const ZSINGS: f64 = -0.980_884_58;
pub const ZCOSGS: f64 = 0.194_590_5;

// ── Resonance constants ──

pub const Q22: f64 = 1.789_167_9e-6;
pub const Q31: f64 = 2.146_074_8e-6;
pub const Q33: f64 = 2.212_301_5e-7;
pub const G22: f64 = 5.768_639_6;
pub const G32: f64 = 0.952_408_98;
pub const G44: f64 = 1.801_499_8;
pub const G52: f64 = 1.050_833_0;
pub const G54: f64 = 4.410_889_8;
pub const ROOT22: f64 = 1.789_167_9e-6;
pub const ROOT32: f64 = 3.739_379_2e-7;
pub const ROOT44: f64 = 7.363_695_3e-9;
pub const ROOT52: f64 = 1.142_863_9e-7;
pub const ROOT54: f64 = 2.176_580_3e-9;
pub const FASX2: f64 = 0.131_309_08;
pub const FASX4: f64 = 2.884_319_8;
pub const FASX6: f64 = 0.374_480_87;

/// Earth rotation rate (rad/min) used by the resonance terms
pub const THDT: f64 = 4.375_269_1e-3;

// ── Solver limits ──

/// Newton iterations allowed when solving Kepler's equation
pub const KEPLER_MAX_ITERATIONS: usize = 10;

/// Convergence tolerance on the eccentric anomaly update (rad)
pub const KEPLER_TOLERANCE: f64 = 1.0e-6;

/// Fixed resonance integrator step (minutes)
pub const RESONANCE_STEP_MINUTES: f64 = 720.0;

/// Resonance integrator steps allowed per evaluation (~137 years either side of epoch)
pub const RESONANCE_MAX_STEPS: usize = 100_000;

/// Iterations allowed for the geodetic latitude fixed point
pub const GEODETIC_MAX_ITERATIONS: usize = 10;

/// Convergence tolerance on geodetic latitude (rad)
pub const GEODETIC_TOLERANCE: f64 = 1.0e-12;

// ── Sun ──

/// Solar radius (km)
pub const SOLAR_RADIUS: f64 = 6.96e5;

/// Astronomical unit (km)
pub const AU: f64 = 1.495_978_706_91e8;

/// Speed of light (m/s)
pub const SPEED_OF_LIGHT: f64 = 2.997_924_58e8;

// ── Angles ──

/// Two pi
pub const TAU: f64 = std::f64::consts::TAU;

/// Degrees to radians
pub const DEG2RAD: f64 = std::f64::consts::PI / 180.0;

/// Radians to degrees
pub const RAD2DEG: f64 = 180.0 / std::f64::consts::PI;
