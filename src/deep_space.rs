//! SDP4: deep-space orbits (period of 225 minutes or more).
//!
//! Adds to the shared SGP4 secular terms:
//! - lunar and solar secular rates and long-period periodics,
//! - geopotential resonance for synchronous (~24 h) and half-day (~12 h,
//!   eccentric) orbits, integrated from epoch with a fixed 720 minute step.
//!
//! The resonance integrator restarts at epoch on every evaluation and the
//! lunisolar periodics are recomputed for every instant, so a propagation
//! depends only on the element set and the requested time.

use std::f64::consts::PI;

use crate::constants::*;
use crate::elements::OrbitalElements;
use crate::propagator::{osculate, EciState, MeanState, Secular};
use crate::time::{ac_tan, fmod2p};

/// Lunar-solar orientation of one perturbing body relative to the orbit.
struct Body {
    zcosg: f64,
    zsing: f64,
    zcosi: f64,
    zsini: f64,
    zcosh: f64,
    zsinh: f64,
    /// Perturbation coefficient
    cc: f64,
    /// Mean motion (rad/min)
    zn: f64,
    /// Eccentricity
    ze: f64,
}

/// Secular rates contributed by one body (per minute).
#[derive(Debug, Clone, Copy, Default)]
struct BodyRates {
    se: f64,
    si: f64,
    sl: f64,
    sgh: f64,
    sh: f64,
}

/// Long-period periodic coefficients of one body.
#[derive(Debug, Clone, Copy, Default)]
struct PeriodicCoeffs {
    e2: f64,
    e3: f64,
    i2: f64,
    i3: f64,
    l2: f64,
    l3: f64,
    l4: f64,
    gh2: f64,
    gh3: f64,
    gh4: f64,
    h2: f64,
    h3: f64,
}

impl PeriodicCoeffs {
    /// Periodic contributions at mean anomaly `zm` of the perturbing body:
    /// (e, i, l, gh, h).
    fn evaluate(&self, zm: f64, ze: f64) -> [f64; 5] {
        let zf = zm + 2.0 * ze * zm.sin();
        let sinzf = zf.sin();
        let f2 = 0.5 * sinzf * sinzf - 0.25;
        let f3 = -0.5 * sinzf * zf.cos();
        [
            self.e2 * f2 + self.e3 * f3,
            self.i2 * f2 + self.i3 * f3,
            self.l2 * f2 + self.l3 * f3 + self.l4 * sinzf,
            self.gh2 * f2 + self.gh3 * f3 + self.gh4 * sinzf,
            self.h2 * f2 + self.h3 * f3,
        ]
    }
}

/// Geopotential resonance class and its integration constants.
#[derive(Debug, Clone)]
pub(crate) enum Resonance {
    None,
    /// One revolution per sidereal day.
    Synchronous {
        del1: f64,
        del2: f64,
        del3: f64,
        xlamo: f64,
        xfact: f64,
    },
    /// Two revolutions per day with eccentricity ≥ 0.5.
    HalfDay {
        d2201: f64,
        d2211: f64,
        d3210: f64,
        d3222: f64,
        d4410: f64,
        d4422: f64,
        d5220: f64,
        d5232: f64,
        d5421: f64,
        d5433: f64,
        xlamo: f64,
        xfact: f64,
    },
}

/// Mean elements carried through the deep-space updates.
#[derive(Debug, Clone, Copy)]
struct DeepElements {
    xll: f64,
    omgadf: f64,
    xnode: f64,
    em: f64,
    xinc: f64,
    xn: f64,
}

/// Epoch terms for the deep-space model.
#[derive(Debug, Clone)]
pub(crate) struct DeepSpace {
    sec: Secular,
    /// Greenwich sidereal angle at epoch (rad)
    thgr: f64,
    xnq: f64,
    xqncl: f64,
    omegaq: f64,
    zmol: f64,
    zmos: f64,
    sse: f64,
    ssi: f64,
    ssl: f64,
    ssg: f64,
    ssh: f64,
    solar: PeriodicCoeffs,
    lunar: PeriodicCoeffs,
    resonance: Resonance,
}

/// `sh / sinio`, zero for equatorial orbits where the node is undefined.
fn node_rate(sh: f64, sinio: f64) -> f64 {
    if sh == 0.0 || sinio == 0.0 {
        0.0
    } else {
        sh / sinio
    }
}

impl DeepSpace {
    pub fn new(el: &OrbitalElements) -> Self {
        let sec = Secular::new(el);
        let eq = el.eccentricity();
        let xnq = sec.xnodp;
        let aqnv = 1.0 / sec.aodp;
        let xqncl = el.inclination_rad();
        let (sinq, cosq) = el.raan_rad().sin_cos();
        let (sing, cosg) = el.arg_perigee_rad().sin_cos();

        let ds50 = el.epoch_julian() - 2_433_281.5;
        let thgr = fmod2p(6.300_388_098_7 * ds50 + 1.729_444_94);

        // Lunar orbit orientation at epoch, days since 1900 Jan 0.5
        let day = ds50 + 18_261.5;
        let xnodce = 4.523_602_0 - 9.242_202_9e-4 * day;
        let (stem, ctem) = xnodce.sin_cos();
        let zcosil = 0.913_751_64 - 0.035_680_96 * ctem;
        let zsinil = (1.0 - zcosil * zcosil).sqrt();
        let zsinhl = 0.089_683_511 * stem / zsinil;
        let zcoshl = (1.0 - zsinhl * zsinhl).sqrt();
        let c = 4.719_967_2 + 0.229_971_50 * day;
        let gam = 5.835_151_4 + 0.001_944_368_0 * day;
        let zmol = fmod2p(c - gam);
        let zx = 0.397_854_16 * stem / zsinil;
        let zy = zcoshl * ctem + 0.917_448_67 * zsinhl * stem;
        let zx = gam + ac_tan(zx, zy) - xnodce;
        let (zsingl, zcosgl) = zx.sin_cos();
        let zmos = fmod2p(6.256_583_7 + 0.017_201_977 * day);

        let sun = Body {
            zcosg: ZCOSGS,
            zsing: ZSINGS,
            zcosi: ZCOSIS,
            zsini: ZSINIS,
            zcosh: cosq,
            zsinh: sinq,
            cc: C1SS,
            zn: ZNS,
            ze: ZES,
        };
        let moon = Body {
            zcosg: zcosgl,
            zsing: zsingl,
            zcosi: zcosil,
            zsini: zsinil,
            zcosh: zcoshl * cosq + zsinhl * sinq,
            zsinh: sinq * zcoshl - cosq * zsinhl,
            cc: C1L,
            zn: ZNL,
            ze: ZEL,
        };

        let (solar_rates, solar) = lunisolar_terms(&sec, &sun, eq, xnq, xqncl, sing, cosg);
        let (lunar_rates, lunar) = lunisolar_terms(&sec, &moon, eq, xnq, xqncl, sing, cosg);

        let mut ds = DeepSpace {
            sse: solar_rates.se + lunar_rates.se,
            ssi: solar_rates.si + lunar_rates.si,
            ssl: solar_rates.sl + lunar_rates.sl,
            ssg: solar_rates.sgh - sec.cosio * node_rate(solar_rates.sh, sec.sinio) + lunar_rates.sgh
                - sec.cosio * node_rate(lunar_rates.sh, sec.sinio),
            ssh: node_rate(solar_rates.sh, sec.sinio) + node_rate(lunar_rates.sh, sec.sinio),
            sec,
            thgr,
            xnq,
            xqncl,
            omegaq: el.arg_perigee_rad(),
            zmol,
            zmos,
            solar,
            lunar,
            resonance: Resonance::None,
        };
        ds.resonance = ds.resonance_terms(el, eq, aqnv);
        ds
    }

    pub fn secular(&self) -> &Secular {
        &self.sec
    }

    fn resonance_terms(&self, el: &OrbitalElements, eq: f64, aqnv: f64) -> Resonance {
        let sec = &self.sec;
        let xnq = self.xnq;
        let eosq = sec.eosq;

        if xnq > 0.003_490_658_5 && xnq < 0.005_235_987_7 {
            let g200 = 1.0 + eosq * (-2.5 + 0.8125 * eosq);
            let g310 = 1.0 + 2.0 * eosq;
            let g300 = 1.0 + eosq * (-6.0 + 6.60937 * eosq);
            let f220 = 0.75 * (1.0 + sec.cosio) * (1.0 + sec.cosio);
            let f311 =
                0.9375 * sec.sinio * sec.sinio * (1.0 + 3.0 * sec.cosio) - 0.75 * (1.0 + sec.cosio);
            let f330 = 1.875 * (1.0 + sec.cosio).powi(3);
            let del1 = 3.0 * xnq * xnq * aqnv * aqnv;
            let del2 = 2.0 * del1 * f220 * g200 * Q22;
            let del3 = 3.0 * del1 * f330 * g300 * Q33 * aqnv;
            let del1 = del1 * f311 * g310 * Q31 * aqnv;
            let xlamo = el.mean_anomaly_rad() + el.raan_rad() + el.arg_perigee_rad() - self.thgr;
            let bfact = sec.xmdot + (sec.omgdot + sec.xnodot) - THDT + self.ssl + self.ssg + self.ssh;
            return Resonance::Synchronous {
                del1,
                del2,
                del3,
                xlamo,
                xfact: bfact - xnq,
            };
        }

        if !(0.00826..=0.00924).contains(&xnq) || eq < 0.5 {
            return Resonance::None;
        }

        let eoc = eq * eosq;
        let g201 = -0.306 - (eq - 0.64) * 0.440;
        let (g211, g310, g322, g410, g422, g520);
        if eq <= 0.65 {
            g211 = 3.616 - 13.247 * eq + 16.290 * eosq;
            g310 = -19.302 + 117.390 * eq - 228.419 * eosq + 156.591 * eoc;
            g322 = -18.9068 + 109.7927 * eq - 214.6334 * eosq + 146.5816 * eoc;
            g410 = -41.122 + 242.694 * eq - 471.094 * eosq + 313.953 * eoc;
            g422 = -146.407 + 841.880 * eq - 1629.014 * eosq + 1083.435 * eoc;
            g520 = -532.114 + 3017.977 * eq - 5740.0 * eosq + 3708.276 * eoc;
        } else {
            g211 = -72.099 + 331.819 * eq - 508.738 * eosq + 266.724 * eoc;
            g310 = -346.844 + 1582.851 * eq - 2415.925 * eosq + 1246.113 * eoc;
            g322 = -342.585 + 1554.908 * eq - 2366.899 * eosq + 1215.972 * eoc;
            g410 = -1052.797 + 4758.686 * eq - 7193.992 * eosq + 3651.957 * eoc;
            g422 = -3581.69 + 16178.11 * eq - 24462.77 * eosq + 12422.52 * eoc;
            g520 = if eq <= 0.715 {
                1464.74 - 4664.75 * eq + 3763.64 * eosq
            } else {
                -5149.66 + 29936.92 * eq - 54087.36 * eosq + 31324.56 * eoc
            };
        }

        let (g533, g521, g532);
        if eq < 0.7 {
            g533 = -919.2277 + 4988.61 * eq - 9064.77 * eosq + 5542.21 * eoc;
            g521 = -822.71072 + 4568.6173 * eq - 8491.4146 * eosq + 5337.524 * eoc;
            g532 = -853.666 + 4690.25 * eq - 8624.77 * eosq + 5341.4 * eoc;
        } else {
            g533 = -37995.78 + 161616.52 * eq - 229838.2 * eosq + 109377.94 * eoc;
            g521 = -51752.104 + 218913.95 * eq - 309468.16 * eosq + 146349.42 * eoc;
            g532 = -40023.88 + 170470.89 * eq - 242699.48 * eosq + 115605.82 * eoc;
        }

        let (sinio, cosio, theta2) = (sec.sinio, sec.cosio, sec.theta2);
        let sini2 = sinio * sinio;
        let f220 = 0.75 * (1.0 + 2.0 * cosio + theta2);
        let f221 = 1.5 * sini2;
        let f321 = 1.875 * sinio * (1.0 - 2.0 * cosio - 3.0 * theta2);
        let f322 = -1.875 * sinio * (1.0 + 2.0 * cosio - 3.0 * theta2);
        let f441 = 35.0 * sini2 * f220;
        let f442 = 39.3750 * sini2 * sini2;
        let f522 = 9.84375
            * sinio
            * (sini2 * (1.0 - 2.0 * cosio - 5.0 * theta2)
                + 0.33333333 * (-2.0 + 4.0 * cosio + 6.0 * theta2));
        let f523 = sinio
            * (4.92187512 * sini2 * (-2.0 - 4.0 * cosio + 10.0 * theta2)
                + 6.56250012 * (1.0 + 2.0 * cosio - 3.0 * theta2));
        let f542 = 29.53125 * sinio * (2.0 - 8.0 * cosio + theta2 * (-12.0 + 8.0 * cosio + 10.0 * theta2));
        let f543 = 29.53125 * sinio * (-2.0 - 8.0 * cosio + theta2 * (12.0 + 8.0 * cosio - 10.0 * theta2));

        let ainv2 = aqnv * aqnv;
        let mut temp1 = 3.0 * xnq * xnq * ainv2;
        let mut temp = temp1 * ROOT22;
        let d2201 = temp * f220 * g201;
        let d2211 = temp * f221 * g211;
        temp1 *= aqnv;
        temp = temp1 * ROOT32;
        let d3210 = temp * f321 * g310;
        let d3222 = temp * f322 * g322;
        temp1 *= aqnv;
        temp = 2.0 * temp1 * ROOT44;
        let d4410 = temp * f441 * g410;
        let d4422 = temp * f442 * g422;
        temp1 *= aqnv;
        temp = temp1 * ROOT52;
        let d5220 = temp * f522 * g520;
        let d5232 = temp * f523 * g532;
        temp = 2.0 * temp1 * ROOT54;
        let d5421 = temp * f542 * g521;
        let d5433 = temp * f543 * g533;

        let xlamo = el.mean_anomaly_rad() + 2.0 * el.raan_rad() - 2.0 * self.thgr;
        let bfact = sec.xmdot + 2.0 * sec.xnodot - 2.0 * THDT + self.ssl + 2.0 * self.ssh;

        Resonance::HalfDay {
            d2201,
            d2211,
            d3210,
            d3222,
            d4410,
            d4422,
            d5220,
            d5232,
            d5421,
            d5433,
            xlamo,
            xfact: bfact - xnq,
        }
    }

    pub(crate) fn resonance(&self) -> &Resonance {
        &self.resonance
    }

    /// Mean motion and resonant mean longitude at `t`, integrated from epoch.
    /// The flag is false when the step cap was reached before `t`.
    fn integrate(&self, t: f64) -> Option<(f64, f64, bool)> {
        let (xlamo, xfact) = match self.resonance {
            Resonance::None => return None,
            Resonance::Synchronous { xlamo, xfact, .. } => (xlamo, xfact),
            Resonance::HalfDay { xlamo, xfact, .. } => (xlamo, xfact),
        };

        let delt = if t >= 0.0 { RESONANCE_STEP_MINUTES } else { -RESONANCE_STEP_MINUTES };
        let step2 = 0.5 * RESONANCE_STEP_MINUTES * RESONANCE_STEP_MINUTES;
        let mut atime = 0.0;
        let mut xli = xlamo;
        let mut xni = self.xnq;
        let mut steps = 0;

        loop {
            let (xndot, xnddt) = self.dot_terms(xli, atime);
            let xldot = xni + xfact;
            let xnddt = xnddt * xldot;

            let remaining = t - atime;
            let capped = steps >= RESONANCE_MAX_STEPS;
            if remaining.abs() < RESONANCE_STEP_MINUTES || capped {
                let ft = remaining;
                let xn = xni + xndot * ft + xnddt * ft * ft * 0.5;
                let xl = xli + xldot * ft + xndot * ft * ft * 0.5;
                return Some((xn, xl, !capped));
            }

            xli += xldot * delt + xndot * step2;
            xni += xndot * delt + xnddt * step2;
            atime += delt;
            steps += 1;
        }
    }

    /// First and second derivatives of the resonant mean motion (the second
    /// still to be scaled by the longitude rate).
    fn dot_terms(&self, xli: f64, atime: f64) -> (f64, f64) {
        match self.resonance {
            Resonance::None => (0.0, 0.0),
            Resonance::Synchronous { del1, del2, del3, .. } => {
                let xndot = del1 * (xli - FASX2).sin()
                    + del2 * (2.0 * (xli - FASX4)).sin()
                    + del3 * (3.0 * (xli - FASX6)).sin();
                let xnddt = del1 * (xli - FASX2).cos()
                    + 2.0 * del2 * (2.0 * (xli - FASX4)).cos()
                    + 3.0 * del3 * (3.0 * (xli - FASX6)).cos();
                (xndot, xnddt)
            }
            Resonance::HalfDay {
                d2201,
                d2211,
                d3210,
                d3222,
                d4410,
                d4422,
                d5220,
                d5232,
                d5421,
                d5433,
                ..
            } => {
                let xomi = self.omegaq + self.sec.omgdot * atime;
                let x2omi = xomi + xomi;
                let x2li = xli + xli;
                let xndot = d2201 * (x2omi + xli - G22).sin()
                    + d2211 * (xli - G22).sin()
                    + d3210 * (xomi + xli - G32).sin()
                    + d3222 * (-xomi + xli - G32).sin()
                    + d4410 * (x2omi + x2li - G44).sin()
                    + d4422 * (x2li - G44).sin()
                    + d5220 * (xomi + xli - G52).sin()
                    + d5232 * (-xomi + xli - G52).sin()
                    + d5421 * (xomi + x2li - G54).sin()
                    + d5433 * (-xomi + x2li - G54).sin();
                let xnddt = d2201 * (x2omi + xli - G22).cos()
                    + d2211 * (xli - G22).cos()
                    + d3210 * (xomi + xli - G32).cos()
                    + d3222 * (-xomi + xli - G32).cos()
                    + d5220 * (xomi + xli - G52).cos()
                    + d5232 * (-xomi + xli - G52).cos()
                    + 2.0
                        * (d4410 * (x2omi + x2li - G44).cos()
                            + d4422 * (x2li - G44).cos()
                            + d5421 * (xomi + x2li - G54).cos()
                            + d5433 * (-xomi + x2li - G54).cos());
                (xndot, xnddt)
            }
        }
    }

    /// Lunar-solar secular rates and resonance. Returns false when the
    /// resonance integrator hit its step cap.
    fn apply_secular(&self, el: &OrbitalElements, t: f64, d: &mut DeepElements) -> bool {
        d.xll += self.ssl * t;
        d.omgadf += self.ssg * t;
        d.xnode += self.ssh * t;
        d.em = el.eccentricity() + self.sse * t;
        d.xinc = el.inclination_rad() + self.ssi * t;
        if d.xinc < 0.0 {
            d.xinc = -d.xinc;
            d.xnode += PI;
            d.omgadf -= PI;
        }

        let Some((xn, xl, converged)) = self.integrate(t) else {
            return true;
        };
        d.xn = xn;
        let temp = -d.xnode + self.thgr + t * THDT;
        d.xll = match self.resonance {
            Resonance::Synchronous { .. } => xl - d.omgadf + temp,
            _ => xl + 2.0 * temp,
        };
        converged
    }

    /// Lunar-solar long-period periodics.
    fn apply_periodics(&self, t: f64, d: &mut DeepElements) {
        let [ses, sis, sls, sghs, shs] = self.solar.evaluate(self.zmos + ZNS * t, ZES);
        let [sel, sil, sll, sghl, sh1] = self.lunar.evaluate(self.zmol + ZNL * t, ZEL);
        let pe = ses + sel;
        let pinc = sis + sil;
        let pl = sls + sll;
        let mut pgh = sghs + sghl;
        let mut ph = shs + sh1;

        let (sinis, cosis) = d.xinc.sin_cos();
        d.xinc += pinc;
        d.em += pe;

        if self.xqncl >= 0.2 {
            ph /= self.sec.sinio;
            pgh -= self.sec.cosio * ph;
            d.omgadf += pgh;
            d.xnode += ph;
            d.xll += pl;
            return;
        }

        // Lyddane modification for low inclinations
        let (sinok, cosok) = d.xnode.sin_cos();
        let alfdp = sinis * sinok + ph * cosok + pinc * cosis * sinok;
        let betdp = sinis * cosok - ph * sinok + pinc * cosis * cosok;
        d.xnode = fmod2p(d.xnode);
        let xls = d.xll + d.omgadf + cosis * d.xnode + pl + pgh - pinc * d.xnode * sinis;
        let xnoh = d.xnode;
        d.xnode = ac_tan(alfdp, betdp);
        // Keep the node on the same branch as before the correction
        if (xnoh - d.xnode).abs() > PI {
            if d.xnode < xnoh {
                d.xnode += TAU;
            } else {
                d.xnode -= TAU;
            }
        }
        d.xll += pl;
        d.omgadf = xls - d.xll - d.xinc.cos() * d.xnode;
    }

    pub fn propagate(&self, el: &OrbitalElements, tsince: f64) -> EciState {
        let sec = &self.sec;

        let tsq = tsince * tsince;
        let tempa = 1.0 - sec.c1 * tsince;
        let tempe = el.bstar() * sec.c4 * tsince;
        let templ = sec.t2cof * tsq;

        let mut d = DeepElements {
            xll: el.mean_anomaly_rad() + sec.xmdot * tsince,
            omgadf: el.arg_perigee_rad() + sec.omgdot * tsince,
            xnode: el.raan_rad() + sec.xnodot * tsince + sec.xnodcf * tsq,
            em: el.eccentricity(),
            xinc: el.inclination_rad(),
            xn: sec.xnodp,
        };

        let resonance_converged = self.apply_secular(el, tsince, &mut d);

        let a = (XKE / d.xn).powf(TOTHRD) * tempa * tempa;
        d.em -= tempe;
        d.xll += sec.xnodp * templ;

        self.apply_periodics(tsince, &mut d);

        let mean = MeanState {
            a,
            e: d.em,
            omega: d.omgadf,
            xl: d.xll + d.omgadf + d.xnode,
            xnode: d.xnode,
            xinc: d.xinc,
            omgadf: d.omgadf,
        };
        let mut state = osculate(sec, &mean);
        state.converged &= resonance_converged;
        state
    }
}

/// Secular rates and periodic coefficients from one perturbing body.
fn lunisolar_terms(
    sec: &Secular,
    body: &Body,
    eq: f64,
    xnq: f64,
    xqncl: f64,
    sing: f64,
    cosg: f64,
) -> (BodyRates, PeriodicCoeffs) {
    let (cosio, sinio, eosq) = (sec.cosio, sec.sinio, sec.eosq);
    let Body { zcosg, zsing, zcosi, zsini, zcosh, zsinh, cc, zn, ze } = *body;

    let a1 = zcosg * zcosh + zsing * zcosi * zsinh;
    let a3 = -zsing * zcosh + zcosg * zcosi * zsinh;
    let a7 = -zcosg * zsinh + zsing * zcosi * zcosh;
    let a8 = zsing * zsini;
    let a9 = zsing * zsinh + zcosg * zcosi * zcosh;
    let a10 = zcosg * zsini;
    let a2 = cosio * a7 + sinio * a8;
    let a4 = cosio * a9 + sinio * a10;
    let a5 = -sinio * a7 + cosio * a8;
    let a6 = -sinio * a9 + cosio * a10;
    let x1 = a1 * cosg + a2 * sing;
    let x2 = a3 * cosg + a4 * sing;
    let x3 = -a1 * sing + a2 * cosg;
    let x4 = -a3 * sing + a4 * cosg;
    let x5 = a5 * sing;
    let x6 = a6 * sing;
    let x7 = a5 * cosg;
    let x8 = a6 * cosg;
    let z31 = 12.0 * x1 * x1 - 3.0 * x3 * x3;
    let z32 = 24.0 * x1 * x2 - 6.0 * x3 * x4;
    let z33 = 12.0 * x2 * x2 - 3.0 * x4 * x4;
    let mut z1 = 3.0 * (a1 * a1 + a2 * a2) + z31 * eosq;
    let mut z2 = 6.0 * (a1 * a3 + a2 * a4) + z32 * eosq;
    let mut z3 = 3.0 * (a3 * a3 + a4 * a4) + z33 * eosq;
    let z11 = -6.0 * a1 * a5 + eosq * (-24.0 * x1 * x7 - 6.0 * x3 * x5);
    let z12 = -6.0 * (a1 * a6 + a3 * a5) + eosq * (-24.0 * (x2 * x7 + x1 * x8) - 6.0 * (x3 * x6 + x4 * x5));
    let z13 = -6.0 * a3 * a6 + eosq * (-24.0 * x2 * x8 - 6.0 * x4 * x6);
    let z21 = 6.0 * a2 * a5 + eosq * (24.0 * x1 * x5 - 6.0 * x3 * x7);
    let z22 = 6.0 * (a4 * a5 + a2 * a6) + eosq * (24.0 * (x2 * x5 + x1 * x6) - 6.0 * (x4 * x7 + x3 * x8));
    let z23 = 6.0 * a4 * a6 + eosq * (24.0 * x2 * x6 - 6.0 * x4 * x8);
    z1 = z1 + z1 + sec.betao2 * z31;
    z2 = z2 + z2 + sec.betao2 * z32;
    z3 = z3 + z3 + sec.betao2 * z33;

    let s3 = cc / xnq;
    let s2 = -0.5 * s3 / sec.betao;
    let s4 = s3 * sec.betao;
    let s1 = -15.0 * eq * s4;
    let s5 = x1 * x3 + x2 * x4;
    let s6 = x2 * x3 + x1 * x4;
    let s7 = x2 * x4 - x1 * x3;

    let rates = BodyRates {
        se: s1 * zn * s5,
        si: s2 * zn * (z11 + z13),
        sl: -zn * s3 * (z1 + z3 - 14.0 - 6.0 * eosq),
        sgh: s4 * zn * (z31 + z33 - 6.0),
        // Node rate is undefined below 3°
        sh: if xqncl < 5.235_987_7e-2 { 0.0 } else { -zn * s2 * (z21 + z23) },
    };

    let coeffs = PeriodicCoeffs {
        e2: 2.0 * s1 * s6,
        e3: 2.0 * s1 * s7,
        i2: 2.0 * s2 * z12,
        i3: 2.0 * s2 * (z13 - z11),
        l2: -2.0 * s3 * z2,
        l3: -2.0 * s3 * (z3 - z1),
        l4: -2.0 * s3 * (-21.0 - 9.0 * eosq) * ze,
        gh2: 2.0 * s4 * z32,
        gh3: 2.0 * s4 * (z33 - z31),
        gh4: -18.0 * s4 * ze,
        h2: -2.0 * s2 * z22,
        h3: -2.0 * s2 * (z23 - z21),
    };

    (rates, coeffs)
}
