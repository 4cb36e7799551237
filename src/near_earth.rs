//! SGP4: near-earth orbits (period below 225 minutes).

use crate::constants::*;
use crate::elements::OrbitalElements;
use crate::propagator::{osculate, EciState, MeanState, Secular};

/// Epoch terms for the near-earth model.
#[derive(Debug, Clone)]
pub(crate) struct NearEarth {
    sec: Secular,
    /// Perigee below 220 km: the higher-order drag terms are dropped.
    simple: bool,
    c5: f64,
    omgcof: f64,
    xmcof: f64,
    delmo: f64,
    sinmo: f64,
    d2: f64,
    d3: f64,
    d4: f64,
    t3cof: f64,
    t4cof: f64,
    t5cof: f64,
}

impl NearEarth {
    pub fn new(el: &OrbitalElements) -> Self {
        let sec = Secular::new(el);
        let eo = el.eccentricity();
        let bstar = el.bstar();

        let simple = sec.aodp * (1.0 - eo) / AE < 220.0 / XKMPER + AE;

        let c3 = if eo > 1.0e-4 {
            sec.coef * sec.tsi * sec.a3ovk2 * sec.xnodp * AE * sec.sinio / eo
        } else {
            0.0
        };
        let c5 = 2.0
            * sec.coef1
            * sec.aodp
            * sec.betao2
            * (1.0 + 2.75 * (sec.etasq + sec.eeta) + sec.eeta * sec.etasq);
        let omgcof = bstar * c3 * el.arg_perigee_rad().cos();
        let xmcof = if eo > 1.0e-4 {
            -TOTHRD * sec.coef * bstar * AE / sec.eeta
        } else {
            0.0
        };
        let delmo = (1.0 + sec.eta * el.mean_anomaly_rad().cos()).powi(3);
        let sinmo = el.mean_anomaly_rad().sin();

        let (mut d2, mut d3, mut d4) = (0.0, 0.0, 0.0);
        let (mut t3cof, mut t4cof, mut t5cof) = (0.0, 0.0, 0.0);
        if !simple {
            let c1 = sec.c1;
            let c1sq = c1 * c1;
            d2 = 4.0 * sec.aodp * sec.tsi * c1sq;
            let temp = d2 * sec.tsi * c1 / 3.0;
            d3 = (17.0 * sec.aodp + sec.s4) * temp;
            d4 = 0.5 * temp * sec.aodp * sec.tsi * (221.0 * sec.aodp + 31.0 * sec.s4) * c1;
            t3cof = d2 + 2.0 * c1sq;
            t4cof = 0.25 * (3.0 * d3 + c1 * (12.0 * d2 + 10.0 * c1sq));
            t5cof = 0.2 * (3.0 * d4 + 12.0 * c1 * d3 + 6.0 * d2 * d2 + 15.0 * c1sq * (2.0 * d2 + c1sq));
        }

        NearEarth {
            sec,
            simple,
            c5,
            omgcof,
            xmcof,
            delmo,
            sinmo,
            d2,
            d3,
            d4,
            t3cof,
            t4cof,
            t5cof,
        }
    }

    pub fn secular(&self) -> &Secular {
        &self.sec
    }

    pub fn propagate(&self, el: &OrbitalElements, tsince: f64) -> EciState {
        let sec = &self.sec;
        let bstar = el.bstar();

        // Secular gravity and atmospheric drag
        let xmdf = el.mean_anomaly_rad() + sec.xmdot * tsince;
        let omgadf = el.arg_perigee_rad() + sec.omgdot * tsince;
        let xnoddf = el.raan_rad() + sec.xnodot * tsince;
        let mut omega = omgadf;
        let mut xmp = xmdf;
        let tsq = tsince * tsince;
        let xnode = xnoddf + sec.xnodcf * tsq;
        let mut tempa = 1.0 - sec.c1 * tsince;
        let mut tempe = bstar * sec.c4 * tsince;
        let mut templ = sec.t2cof * tsq;

        if !self.simple {
            let delomg = self.omgcof * tsince;
            let delm = self.xmcof * ((1.0 + sec.eta * xmdf.cos()).powi(3) - self.delmo);
            let temp = delomg + delm;
            xmp = xmdf + temp;
            omega = omgadf - temp;
            let tcube = tsq * tsince;
            let tfour = tsince * tcube;
            tempa = tempa - self.d2 * tsq - self.d3 * tcube - self.d4 * tfour;
            tempe += bstar * self.c5 * (xmp.sin() - self.sinmo);
            templ += self.t3cof * tcube + tfour * (self.t4cof + tsince * self.t5cof);
        }

        let mean = MeanState {
            a: sec.aodp * tempa * tempa,
            e: el.eccentricity() - tempe,
            omega,
            xl: xmp + omega + xnode + sec.xnodp * templ,
            xnode,
            xinc: el.inclination_rad(),
            omgadf,
        };
        osculate(sec, &mean)
    }
}
