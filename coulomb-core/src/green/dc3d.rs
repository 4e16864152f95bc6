//! Closed-form half-space kernels of Okada (1992).
//!
//! Coordinates follow Okada's fault frame: `x` along strike, `y` perpendicular
//! to strike with the fault dipping toward `-y` (to the right of strike),
//! `z` up with the free surface at `z = 0` (observation points have `z ≤ 0`).
//! The source origin is on the fault at the given depth; a finite fault spans
//! `al[0] ≤ x ≤ al[1]` along strike and `aw[0] ≤ w ≤ aw[1]` along the updip
//! direction.
//!
//! Every kernel returns 12 values: `ux, uy, uz` followed by the nine
//! derivatives ordered `∂/∂x (ux, uy, uz)`, `∂/∂y (…)`, `∂/∂z (…)`, in the
//! units of the dislocation divided by the units of the coordinates. `None`
//! means the observation point coincides with a displacement discontinuity.

use std::f64::consts::PI;

const EPS: f64 = 1.0e-6;
const PI2: f64 = 2.0 * PI;

/// Kernel output: displacement then displacement derivatives.
pub type Output = [f64; 12];

fn clamp(v: f64) -> f64 {
    if v.abs() < EPS {
        0.0
    } else {
        v
    }
}

fn accumulate(u: &mut Output, du: &Output, factor: f64) {
    for (ui, dui) in u.iter_mut().zip(du) {
        *ui += factor * dui;
    }
}

/// Medium and dip dependent constants shared by all kernels.
#[derive(Debug, Clone, Copy)]
pub struct Kernel {
    alp1: f64,
    alp2: f64,
    alp3: f64,
    alp4: f64,
    alp5: f64,
    sd: f64,
    cd: f64,
    sdsd: f64,
    cdcd: f64,
    sdcd: f64,
    s2d: f64,
    c2d: f64,
}

/// Station-dependent constants of the finite-fault solution.
struct Finite {
    xi: f64,
    et: f64,
    q: f64,
    xi2: f64,
    q2: f64,
    r: f64,
    r3: f64,
    y: f64,
    d: f64,
    tt: f64,
    alx: f64,
    ale: f64,
    x11: f64,
    y11: f64,
    x32: f64,
    y32: f64,
    ey: f64,
    ez: f64,
    fy: f64,
    fz: f64,
    gy: f64,
    gz: f64,
    hy: f64,
    hz: f64,
    et2: f64,
    r2: f64,
    r5: f64,
}

/// Station-dependent constants of the point-source solution.
struct Point {
    x: f64,
    y: f64,
    d: f64,
    p: f64,
    q: f64,
    s: f64,
    t: f64,
    xy: f64,
    x2: f64,
    y2: f64,
    d2: f64,
    r: f64,
    r2: f64,
    r3: f64,
    r5: f64,
    r7: f64,
    a3: f64,
    a5: f64,
    b3: f64,
    c3: f64,
    qr: f64,
    qrx: f64,
    uy: f64,
    uz: f64,
    vy: f64,
    vz: f64,
    wy: f64,
    wz: f64,
}

impl Kernel {
    /// Constants for medium constant `alpha = (λ+μ)/(λ+2μ)` and dip (degrees).
    pub fn new(alpha: f64, dip: f64) -> Self {
        let (mut sd, mut cd) = dip.to_radians().sin_cos();
        if cd.abs() < EPS {
            cd = 0.0;
            sd = if sd > 0.0 { 1.0 } else { -1.0 };
        }
        Self {
            alp1: (1.0 - alpha) / 2.0,
            alp2: alpha / 2.0,
            alp3: (1.0 - alpha) / alpha,
            alp4: 1.0 - alpha,
            alp5: alpha,
            sd,
            cd,
            sdsd: sd * sd,
            cdcd: cd * cd,
            sdcd: sd * cd,
            s2d: 2.0 * sd * cd,
            c2d: cd * cd - sd * sd,
        }
    }

    /// Rectangular dislocation (DC3D).
    ///
    /// # Arguments
    ///
    /// * `station` - Observation point `(x, y, z)`, `z ≤ 0`
    /// * `depth` - Depth of the source origin (positive)
    /// * `al` - Along-strike extent `[al1, al2]`
    /// * `aw` - Along-updip extent `[aw1, aw2]`
    /// * `disl` - Strike-slip (left-lateral), dip-slip (reverse) and tensile
    ///   dislocation
    pub fn dc3d(
        &self,
        station: [f64; 3],
        depth: f64,
        al: [f64; 2],
        aw: [f64; 2],
        disl: [f64; 3],
    ) -> Option<Output> {
        let [x, y, z] = station;
        let (sd, cd) = (self.sd, self.cd);
        let xi = [clamp(x - al[0]), clamp(x - al[1])];
        let mut u = [0.0; 12];

        // Real source
        let d = depth + z;
        let p = y * cd + d * sd;
        let q = clamp(y * sd - d * cd);
        let et = [clamp(p - aw[0]), clamp(p - aw[1])];
        // On the closed fault rectangle the displacement is discontinuous
        if q == 0.0 && xi[0] * xi[1] <= 0.0 && et[0] * et[1] <= 0.0 {
            return None;
        }
        let (kxi, ket) = log_flags(xi, et, q);
        for k in 0..2 {
            for j in 0..2 {
                let c = self.finite(xi[j], et[k], q, kxi[k], ket[j]);
                let dua = self.ua(&c, disl);
                let mut du = [0.0; 12];
                for i in (0..12).step_by(3) {
                    du[i] = -dua[i];
                    du[i + 1] = -dua[i + 1] * cd + dua[i + 2] * sd;
                    du[i + 2] = -dua[i + 1] * sd - dua[i + 2] * cd;
                    if i == 9 {
                        du[i] = -du[i];
                        du[i + 1] = -du[i + 1];
                        du[i + 2] = -du[i + 2];
                    }
                }
                let sign = if j + k == 1 { -1.0 } else { 1.0 };
                accumulate(&mut u, &du, sign);
            }
        }

        // Image source
        let d = depth - z;
        let p = y * cd + d * sd;
        let q = clamp(y * sd - d * cd);
        let et = [clamp(p - aw[0]), clamp(p - aw[1])];
        if q == 0.0
            && ((xi[0] * xi[1] <= 0.0 && et[0] * et[1] == 0.0)
                || (et[0] * et[1] <= 0.0 && xi[0] * xi[1] == 0.0))
        {
            return None;
        }
        let (kxi, ket) = log_flags(xi, et, q);
        for k in 0..2 {
            for j in 0..2 {
                let c = self.finite(xi[j], et[k], q, kxi[k], ket[j]);
                let dua = self.ua(&c, disl);
                let dub = self.ub(&c, disl);
                let duc = self.uc(&c, z, disl);
                let mut du = [0.0; 12];
                for i in (0..12).step_by(3) {
                    du[i] = dua[i] + dub[i] + z * duc[i];
                    du[i + 1] = (dua[i + 1] + dub[i + 1] + z * duc[i + 1]) * cd
                        - (dua[i + 2] + dub[i + 2] + z * duc[i + 2]) * sd;
                    du[i + 2] = (dua[i + 1] + dub[i + 1] - z * duc[i + 1]) * sd
                        + (dua[i + 2] + dub[i + 2] - z * duc[i + 2]) * cd;
                }
                du[9] += duc[0];
                du[10] += duc[1] * cd - duc[2] * sd;
                du[11] -= duc[1] * sd + duc[2] * cd;
                let sign = if j + k == 1 { -1.0 } else { 1.0 };
                accumulate(&mut u, &du, sign);
            }
        }
        Some(u)
    }

    /// Point source (DC3D0).
    ///
    /// # Arguments
    ///
    /// * `station` - Observation point `(x, y, z)`, `z ≤ 0`
    /// * `depth` - Source depth (positive)
    /// * `pot` - Strike-slip, dip-slip, tensile and inflation potency
    ///   (moment / μ, or intensity / λ for inflation)
    pub fn dc3d0(&self, station: [f64; 3], depth: f64, pot: [f64; 4]) -> Option<Output> {
        let [x, y, z] = station;
        let mut u = [0.0; 12];

        // Real source
        let c = self.point(x, y, depth + z)?;
        let dua = self.ua0(&c, pot);
        for i in 0..12 {
            if i < 9 {
                u[i] -= dua[i];
            } else {
                u[i] += dua[i];
            }
        }

        // Image source
        let c = self.point(x, y, depth - z)?;
        let dua = self.ua0(&c, pot);
        let dub = self.ub0(&c, z, pot);
        let duc = self.uc0(&c, z, pot);
        for i in 0..12 {
            let mut du = dua[i] + dub[i] + z * duc[i];
            if i >= 9 {
                du += duc[i - 9];
            }
            u[i] += du;
        }
        Some(u)
    }

    fn finite(&self, xi: f64, et: f64, q: f64, kxi: bool, ket: bool) -> Finite {
        let (sd, cd) = (self.sd, self.cd);
        let xi = clamp(xi);
        let et = clamp(et);
        let q = clamp(q);
        let xi2 = xi * xi;
        let et2 = et * et;
        let q2 = q * q;
        let r2 = xi2 + et2 + q2;
        let r = r2.sqrt();
        let r3 = r * r2;
        let r5 = r3 * r2;
        let y = et * cd + q * sd;
        let d = et * sd - q * cd;

        let tt = if q == 0.0 {
            0.0
        } else {
            (xi * et / (q * r)).atan()
        };

        let (alx, x11, x32) = if kxi {
            (-(r - xi).ln(), 0.0, 0.0)
        } else {
            let rxi = r + xi;
            let x11 = 1.0 / (r * rxi);
            (rxi.ln(), x11, (r + rxi) * x11 * x11 / r)
        };
        let (ale, y11, y32) = if ket {
            (-(r - et).ln(), 0.0, 0.0)
        } else {
            let ret = r + et;
            let y11 = 1.0 / (r * ret);
            (ret.ln(), y11, (r + ret) * y11 * y11 / r)
        };

        Finite {
            xi,
            et,
            q,
            xi2,
            q2,
            r,
            r3,
            y,
            d,
            tt,
            alx,
            ale,
            x11,
            y11,
            x32,
            y32,
            ey: sd / r - y * q / r3,
            ez: cd / r + d * q / r3,
            fy: d / r3 + xi2 * y32 * sd,
            fz: y / r3 + xi2 * y32 * cd,
            gy: 2.0 * x11 * sd - y * q * x32,
            gz: 2.0 * x11 * cd + d * q * x32,
            hy: d * q * x32 + xi * q * y32 * sd,
            hz: y * q * x32 + xi * q * y32 * cd,
            et2,
            r2,
            r5,
        }
    }

    /// Infinite-medium terms of the finite solution.
    fn ua(&self, c: &Finite, disl: [f64; 3]) -> Output {
        let (sd, cd) = (self.sd, self.cd);
        let (alp1, alp2) = (self.alp1, self.alp2);
        let Finite {
            xi, et, q, xi2, q2, r, r3, y, d, tt, alx, ale, x11, y11, y32, ey, ez, fy, fz,
            gy, gz, hy, hz, ..
        } = *c;
        let xy = xi * y11;
        let qx = q * x11;
        let qy = q * y11;
        let mut u = [0.0; 12];

        if disl[0] != 0.0 {
            let du = [
                tt / 2.0 + alp2 * xi * qy,
                alp2 * q / r,
                alp1 * ale - alp2 * q * qy,
                -alp1 * qy - alp2 * xi2 * q * y32,
                -alp2 * xi * q / r3,
                alp1 * xy + alp2 * xi * q2 * y32,
                alp1 * xy * sd + alp2 * xi * fy + d / 2.0 * x11,
                alp2 * ey,
                alp1 * (cd / r + qy * sd) - alp2 * q * fy,
                alp1 * xy * cd + alp2 * xi * fz + y / 2.0 * x11,
                alp2 * ez,
                -alp1 * (sd / r - qy * cd) - alp2 * q * fz,
            ];
            accumulate(&mut u, &du, disl[0] / PI2);
        }
        if disl[1] != 0.0 {
            let du = [
                alp2 * q / r,
                tt / 2.0 + alp2 * et * qx,
                alp1 * alx - alp2 * q * qx,
                -alp2 * xi * q / r3,
                -qy / 2.0 - alp2 * et * q / r3,
                alp1 / r + alp2 * q2 / r3,
                alp2 * ey,
                alp1 * d * x11 + xy / 2.0 * sd + alp2 * et * gy,
                alp1 * y * x11 - alp2 * q * gy,
                alp2 * ez,
                alp1 * y * x11 + xy / 2.0 * cd + alp2 * et * gz,
                -alp1 * d * x11 - alp2 * q * gz,
            ];
            accumulate(&mut u, &du, disl[1] / PI2);
        }
        if disl[2] != 0.0 {
            let du = [
                -alp1 * ale - alp2 * q * qy,
                -alp1 * alx - alp2 * q * qx,
                tt / 2.0 - alp2 * (et * qx + xi * qy),
                -alp1 * xy + alp2 * xi * q2 * y32,
                -alp1 / r + alp2 * q2 / r3,
                -alp1 * qy - alp2 * q * q2 * y32,
                -alp1 * (cd / r + qy * sd) - alp2 * q * fy,
                -alp1 * y * x11 - alp2 * q * gy,
                alp1 * (d * x11 + xy * sd) + alp2 * q * hy,
                alp1 * (sd / r - qy * cd) - alp2 * q * fz,
                alp1 * d * x11 - alp2 * q * gz,
                alp1 * (y * x11 + xy * cd) + alp2 * q * hz,
            ];
            accumulate(&mut u, &du, disl[2] / PI2);
        }
        u
    }

    /// Surface-deformation terms of the finite solution.
    fn ub(&self, c: &Finite, disl: [f64; 3]) -> Output {
        let (sd, cd, sdsd, cdcd, sdcd) = (self.sd, self.cd, self.sdsd, self.cdcd, self.sdcd);
        let alp3 = self.alp3;
        let Finite {
            xi, et, q, xi2, q2, r, r3, y, d, tt, ale, x11, y11, y32, ey, ez, fy, fz, gy, gz,
            hy, hz, ..
        } = *c;

        let rd = r + d;
        let d11 = 1.0 / (r * rd);
        let aj2 = xi * y / rd * d11;
        let aj5 = -(d + y * y / rd) * d11;
        let (ai3, ai4, ak1, ak3, aj3, aj6) = if cd != 0.0 {
            let ai4 = if xi == 0.0 {
                0.0
            } else {
                let x = (xi2 + q2).sqrt();
                1.0 / cdcd
                    * (xi / rd * sdcd
                        + 2.0
                            * ((et * (x + q * cd) + x * (r + x) * sd) / (xi * (r + x) * cd))
                                .atan())
            };
            let ai3 = (y * cd / rd - ale + sd * rd.ln()) / cdcd;
            let ak1 = xi * (d11 - y11 * sd) / cd;
            let ak3 = (q * y11 - y * d11) / cd;
            let aj3 = (ak1 - aj2 * sd) / cd;
            let aj6 = (ak3 - aj5 * sd) / cd;
            (ai3, ai4, ak1, ak3, aj3, aj6)
        } else {
            let rd2 = rd * rd;
            (
                (et / rd + y * q / rd2 - ale) / 2.0,
                xi * y / rd2 / 2.0,
                xi * q / rd * d11,
                sd / rd * (xi2 * d11 - 1.0),
                -xi / rd2 * (q2 * d11 - 0.5),
                -y / rd2 * (xi2 * d11 - 0.5),
            )
        };
        let xy = xi * y11;
        let ai1 = -xi / rd * cd - ai4 * sd;
        let ai2 = rd.ln() + ai3 * sd;
        let ak2 = 1.0 / r + ak3 * sd;
        let ak4 = xy * cd - ak1 * sd;
        let aj1 = aj5 * cd - aj6 * sd;
        let aj4 = -xy - aj2 * cd + aj3 * sd;
        let qx = q * x11;
        let qy = q * y11;
        let mut u = [0.0; 12];

        if disl[0] != 0.0 {
            let du = [
                -xi * qy - tt - alp3 * ai1 * sd,
                -q / r + alp3 * y / rd * sd,
                q * qy - alp3 * ai2 * sd,
                xi2 * q * y32 - alp3 * aj1 * sd,
                xi * q / r3 - alp3 * aj2 * sd,
                -xi * q2 * y32 - alp3 * aj3 * sd,
                -xi * fy - d * x11 + alp3 * (xy + aj4) * sd,
                -ey + alp3 * (1.0 / r + aj5) * sd,
                q * fy - alp3 * (qy - aj6) * sd,
                -xi * fz - y * x11 + alp3 * ak1 * sd,
                -ez + alp3 * y * d11 * sd,
                q * fz + alp3 * ak2 * sd,
            ];
            accumulate(&mut u, &du, disl[0] / PI2);
        }
        if disl[1] != 0.0 {
            let du = [
                -q / r + alp3 * ai3 * sdcd,
                -et * qx - tt - alp3 * xi / rd * sdcd,
                q * qx + alp3 * ai4 * sdcd,
                xi * q / r3 + alp3 * aj4 * sdcd,
                et * q / r3 + qy + alp3 * aj5 * sdcd,
                -q2 / r3 + alp3 * aj6 * sdcd,
                -ey + alp3 * aj1 * sdcd,
                -et * gy - xy * sd + alp3 * aj2 * sdcd,
                q * gy + alp3 * aj3 * sdcd,
                -ez - alp3 * ak3 * sdcd,
                -et * gz - xy * cd - alp3 * xi * d11 * sdcd,
                q * gz - alp3 * ak4 * sdcd,
            ];
            accumulate(&mut u, &du, disl[1] / PI2);
        }
        if disl[2] != 0.0 {
            let du = [
                q * qy - alp3 * ai3 * sdsd,
                q * qx + alp3 * xi / rd * sdsd,
                et * qx + xi * qy - tt - alp3 * ai4 * sdsd,
                -xi * q2 * y32 - alp3 * aj4 * sdsd,
                -q2 / r3 - alp3 * aj5 * sdsd,
                q * q2 * y32 - alp3 * aj6 * sdsd,
                q * fy - alp3 * aj1 * sdsd,
                q * gy - alp3 * aj2 * sdsd,
                -q * hy - alp3 * aj3 * sdsd,
                q * fz + alp3 * ak3 * sdsd,
                q * gz + alp3 * xi * d11 * sdsd,
                -q * hz + alp3 * ak4 * sdsd,
            ];
            accumulate(&mut u, &du, disl[2] / PI2);
        }
        u
    }

    /// Depth-dependent terms of the finite solution.
    fn uc(&self, c: &Finite, z: f64, disl: [f64; 3]) -> Output {
        let (sd, cd, sdsd, cdcd, sdcd) = (self.sd, self.cd, self.sdsd, self.cdcd, self.sdcd);
        let (alp4, alp5) = (self.alp4, self.alp5);
        let Finite {
            xi, et, q, xi2, et2, q2, r, r2, r3, r5, y, d, x11, y11, x32, y32, ..
        } = *c;

        let cc = d + z;
        let x53 = (8.0 * r2 + 9.0 * r * xi + 3.0 * xi2) * x11 * x11 * x11 / r2;
        let y53 = (8.0 * r2 + 9.0 * r * et + 3.0 * et2) * y11 * y11 * y11 / r2;
        let h = q * cd - z;
        let z32 = sd / r3 - h * y32;
        let z53 = 3.0 * sd / r5 - h * y53;
        let y0 = y11 - xi2 * y32;
        let z0 = z32 - xi2 * z53;
        let ppy = cd / r3 + q * y32 * sd;
        let ppz = sd / r3 - q * y32 * cd;
        let qq = z * y32 + z32 + z0;
        let qqy = 3.0 * cc * d / r5 - qq * sd;
        let qqz = 3.0 * cc * y / r5 - qq * cd + q * y32;
        let xy = xi * y11;
        let qy = q * y11;
        let qr = 3.0 * q / r5;
        let cdr = (cc + d) / r3;
        let yy0 = y / r3 - y0 * cd;
        let mut u = [0.0; 12];

        if disl[0] != 0.0 {
            let du = [
                alp4 * xy * cd - alp5 * xi * q * z32,
                alp4 * (cd / r + 2.0 * qy * sd) - alp5 * cc * q / r3,
                alp4 * qy * cd - alp5 * (cc * et / r3 - z * y11 + xi2 * z32),
                alp4 * y0 * cd - alp5 * q * z0,
                -alp4 * xi * (cd / r3 + 2.0 * q * y32 * sd) + alp5 * cc * xi * qr,
                -alp4 * xi * q * y32 * cd + alp5 * xi * (3.0 * cc * et / r5 - qq),
                -alp4 * xi * ppy * cd - alp5 * xi * qqy,
                alp4 * 2.0 * (d / r3 - y0 * sd) * sd - y / r3 * cd
                    - alp5 * (cdr * sd - et / r3 - cc * y * qr),
                -alp4 * q / r3 + yy0 * sd
                    + alp5 * (cdr * cd + cc * d * qr - (y0 * cd + q * z0) * sd),
                alp4 * xi * ppz * cd - alp5 * xi * qqz,
                alp4 * 2.0 * (y / r3 - y0 * cd) * sd + d / r3 * cd
                    - alp5 * (cdr * cd + cc * d * qr),
                yy0 * cd - alp5 * (cdr * sd - cc * y * qr - y0 * sdsd + q * z0 * cd),
            ];
            accumulate(&mut u, &du, disl[0] / PI2);
        }
        if disl[1] != 0.0 {
            let du = [
                alp4 * cd / r - qy * sd - alp5 * cc * q / r3,
                alp4 * y * x11 - alp5 * cc * et * q * x32,
                -d * x11 - xy * sd - alp5 * cc * (x11 - q2 * x32),
                -alp4 * xi / r3 * cd + alp5 * cc * xi * qr + xi * q * y32 * sd,
                -alp4 * y / r3 + alp5 * cc * et * qr,
                d / r3 - y0 * sd + alp5 * cc / r3 * (1.0 - 3.0 * q2 / r2),
                -alp4 * et / r3 + y0 * sdsd - alp5 * (cdr * sd - cc * y * qr),
                alp4 * (x11 - y * y * x32)
                    - alp5 * cc * ((d + 2.0 * q * cd) * x32 - y * et * q * x53),
                xi * ppy * sd + y * d * x32
                    + alp5 * cc * ((y + 2.0 * q * sd) * x32 - y * q2 * x53),
                -q / r3 + y0 * sdcd - alp5 * (cdr * cd + cc * d * qr),
                alp4 * y * d * x32 - alp5 * cc * ((y - 2.0 * q * sd) * x32 + d * et * q * x53),
                -xi * ppz * sd + x11 - d * d * x32
                    - alp5 * cc * ((d - 2.0 * q * cd) * x32 - d * q2 * x53),
            ];
            accumulate(&mut u, &du, disl[1] / PI2);
        }
        if disl[2] != 0.0 {
            let du = [
                -alp4 * (sd / r + qy * cd) - alp5 * (z * y11 - q2 * z32),
                alp4 * 2.0 * xy * sd + d * x11 - alp5 * cc * (x11 - q2 * x32),
                alp4 * (y * x11 + xy * cd) + alp5 * q * (cc * et * x32 + xi * z32),
                alp4 * xi / r3 * sd + xi * q * y32 * cd
                    + alp5 * xi * (3.0 * cc * et / r5 - 2.0 * z32 - z0),
                alp4 * 2.0 * y0 * sd - d / r3 + alp5 * cc / r3 * (1.0 - 3.0 * q2 / r2),
                -alp4 * yy0 - alp5 * (cc * et * qr - q * z0),
                alp4 * (q / r3 + y0 * sdcd) + alp5 * (z / r3 * cd + cc * d * qr - q * z0 * sd),
                -alp4 * 2.0 * xi * ppy * sd - y * d * x32
                    + alp5 * cc * ((y + 2.0 * q * sd) * x32 - y * q2 * x53),
                -alp4 * (xi * ppy * cd - x11 + y * y * x32)
                    + alp5 * (cc * ((d + 2.0 * q * cd) * x32 - y * et * q * x53) + xi * qqy),
                -et / r3 + y0 * cdcd
                    - alp5 * (z / r3 * sd - cc * y * qr - y0 * sdsd + q * z0 * cd),
                alp4 * 2.0 * xi * ppz * sd - x11 + d * d * x32
                    - alp5 * cc * ((d - 2.0 * q * cd) * x32 - d * q2 * x53),
                alp4 * (xi * ppz * cd + y * d * x32)
                    + alp5 * (cc * ((y - 2.0 * q * sd) * x32 + d * et * q * x53) + xi * qqz),
            ];
            accumulate(&mut u, &du, disl[2] / PI2);
        }
        u
    }

    fn point(&self, x: f64, y: f64, d: f64) -> Option<Point> {
        let (sd, cd) = (self.sd, self.cd);
        let x = clamp(x);
        let y = clamp(y);
        let d = clamp(d);
        let p = y * cd + d * sd;
        let q = y * sd - d * cd;
        let x2 = x * x;
        let y2 = y * y;
        let d2 = d * d;
        let r2 = x2 + y2 + d2;
        let r = r2.sqrt();
        if r == 0.0 {
            return None;
        }
        let r3 = r * r2;
        let r5 = r3 * r2;
        let qr = 3.0 * q / r5;
        let s = p * sd + q * cd;
        let t = p * cd - q * sd;
        let uy = sd - 5.0 * y * q / r2;
        let uz = cd + 5.0 * d * q / r2;
        Some(Point {
            x,
            y,
            d,
            p,
            q,
            s,
            t,
            xy: x * y,
            x2,
            y2,
            d2,
            r,
            r2,
            r3,
            r5,
            r7: r5 * r2,
            a3: 1.0 - 3.0 * x2 / r2,
            a5: 1.0 - 5.0 * x2 / r2,
            b3: 1.0 - 3.0 * y2 / r2,
            c3: 1.0 - 3.0 * d2 / r2,
            qr,
            qrx: 5.0 * qr * x / r2,
            uy,
            uz,
            vy: s - 5.0 * y * p * q / r2,
            vz: t + 5.0 * d * p * q / r2,
            wy: uy + sd,
            wz: uz + cd,
        })
    }

    /// Infinite-medium terms of the point-source solution.
    fn ua0(&self, c: &Point, pot: [f64; 4]) -> Output {
        let (sd, cd, s2d, c2d) = (self.sd, self.cd, self.s2d, self.c2d);
        let (alp1, alp2) = (self.alp1, self.alp2);
        let Point {
            x, y, d, p, q, s, t, xy, x2, r3, r5, a3, a5, b3, c3, qr, qrx, uy, uz, vy, vz, wy,
            wz, ..
        } = *c;
        let mut u = [0.0; 12];

        if pot[0] != 0.0 {
            let du = [
                alp1 * q / r3 + alp2 * x2 * qr,
                alp1 * x / r3 * sd + alp2 * xy * qr,
                -alp1 * x / r3 * cd + alp2 * x * d * qr,
                x * qr * (-alp1 + alp2 * (1.0 + a5)),
                alp1 * a3 / r3 * sd + alp2 * y * qr * a5,
                -alp1 * a3 / r3 * cd + alp2 * d * qr * a5,
                alp1 * (sd / r3 - y * qr) + alp2 * 3.0 * x2 / r5 * uy,
                3.0 * x / r5 * (-alp1 * y * sd + alp2 * (y * uy + q)),
                3.0 * x / r5 * (alp1 * y * cd + alp2 * d * uy),
                alp1 * (cd / r3 + d * qr) + alp2 * 3.0 * x2 / r5 * uz,
                3.0 * x / r5 * (alp1 * d * sd + alp2 * y * uz),
                3.0 * x / r5 * (-alp1 * d * cd + alp2 * (d * uz - q)),
            ];
            accumulate(&mut u, &du, pot[0] / PI2);
        }
        if pot[1] != 0.0 {
            let du = [
                alp2 * x * p * qr,
                alp1 * s / r3 + alp2 * y * p * qr,
                -alp1 * t / r3 + alp2 * d * p * qr,
                alp2 * p * qr * a5,
                -alp1 * 3.0 * x * s / r5 - alp2 * y * p * qrx,
                alp1 * 3.0 * x * t / r5 - alp2 * d * p * qrx,
                alp2 * 3.0 * x / r5 * vy,
                alp1 * (s2d / r3 - 3.0 * y * s / r5) + alp2 * (3.0 * y / r5 * vy + p * qr),
                -alp1 * (c2d / r3 - 3.0 * y * t / r5) + alp2 * 3.0 * d / r5 * vy,
                alp2 * 3.0 * x / r5 * vz,
                alp1 * (c2d / r3 + 3.0 * d * s / r5) + alp2 * 3.0 * y / r5 * vz,
                alp1 * (s2d / r3 - 3.0 * d * t / r5) + alp2 * (3.0 * d / r5 * vz - p * qr),
            ];
            accumulate(&mut u, &du, pot[1] / PI2);
        }
        if pot[2] != 0.0 {
            let du = [
                alp1 * x / r3 - alp2 * x * q * qr,
                alp1 * t / r3 - alp2 * y * q * qr,
                alp1 * s / r3 - alp2 * d * q * qr,
                alp1 * a3 / r3 - alp2 * q * qr * a5,
                -alp1 * 3.0 * x * t / r5 + alp2 * y * q * qrx,
                -alp1 * 3.0 * x * s / r5 + alp2 * d * q * qrx,
                -alp1 * 3.0 * xy / r5 - alp2 * x * qr * wy,
                alp1 * (c2d / r3 - 3.0 * y * t / r5) - alp2 * (y * wy + q) * qr,
                alp1 * (s2d / r3 - 3.0 * y * s / r5) - alp2 * d * qr * wy,
                alp1 * 3.0 * x * d / r5 - alp2 * x * qr * wz,
                -alp1 * (s2d / r3 - 3.0 * d * t / r5) - alp2 * y * qr * wz,
                alp1 * (c2d / r3 + 3.0 * d * s / r5) - alp2 * (d * wz - q) * qr,
            ];
            accumulate(&mut u, &du, pot[2] / PI2);
        }
        if pot[3] != 0.0 {
            let du5 = alp1 * 3.0 * xy / r5;
            let du6 = alp1 * 3.0 * x * d / r5;
            let du9 = alp1 * 3.0 * y * d / r5;
            let du = [
                -alp1 * x / r3,
                -alp1 * y / r3,
                -alp1 * d / r3,
                -alp1 * a3 / r3,
                du5,
                du6,
                du5,
                -alp1 * b3 / r3,
                du9,
                -du6,
                -du9,
                alp1 * c3 / r3,
            ];
            accumulate(&mut u, &du, pot[3] / PI2);
        }
        u
    }

    /// Surface-deformation terms of the point-source solution.
    fn ub0(&self, c: &Point, z: f64, pot: [f64; 4]) -> Output {
        let (sd, sdcd, sdsd) = (self.sd, self.sdcd, self.sdsd);
        let alp3 = self.alp3;
        let Point {
            x, y, d, p, q, xy, x2, y2, d2, r, r2, r3, r5, a3, a5, b3, c3, qr, qrx, uy, uz, vy,
            vz, wy, wz, ..
        } = *c;

        let cc = d + z;
        let rd = r + d;
        let d12 = 1.0 / (r * rd * rd);
        let d32 = d12 * (2.0 * r + d) / r2;
        let d33 = d12 * (3.0 * r + d) / (r2 * rd);
        let d53 = d12 * (8.0 * r2 + 9.0 * r * d + 3.0 * d2) / (r2 * r2 * rd);
        let d54 = d12 * (5.0 * r2 + 4.0 * r * d + d2) / r3 * d12;
        let fi1 = y * (d12 - x2 * d33);
        let fi2 = x * (d12 - y2 * d33);
        let fi3 = x / r3 - fi2;
        let fi4 = -xy * d32;
        let fi5 = 1.0 / (r * rd) - x2 * d32;
        let fj1 = -3.0 * xy * (d33 - x2 * d54);
        let fj2 = 1.0 / r3 - 3.0 * d12 + 3.0 * x2 * y2 * d54;
        let fj3 = a3 / r3 - fj2;
        let fj4 = -3.0 * xy / r5 - fj1;
        let fk1 = -y * (d32 - x2 * d53);
        let fk2 = -x * (d32 - y2 * d53);
        let fk3 = -3.0 * x * d / r5 - fk2;
        let mut u = [0.0; 12];

        if pot[0] != 0.0 {
            let du = [
                -x2 * qr - alp3 * fi1 * sd,
                -xy * qr - alp3 * fi2 * sd,
                -cc * x * qr - alp3 * fi4 * sd,
                -x * qr * (1.0 + a5) - alp3 * fj1 * sd,
                -y * qr * a5 - alp3 * fj2 * sd,
                -cc * qr * a5 - alp3 * fk1 * sd,
                -3.0 * x2 / r5 * uy - alp3 * fj2 * sd,
                -3.0 * xy / r5 * uy - x * qr - alp3 * fj4 * sd,
                -3.0 * cc * x / r5 * uy - alp3 * fk2 * sd,
                -3.0 * x2 / r5 * uz + alp3 * fk1 * sd,
                -3.0 * xy / r5 * uz + alp3 * fk2 * sd,
                3.0 * x / r5 * (-cc * uz + alp3 * y * sd),
            ];
            accumulate(&mut u, &du, pot[0] / PI2);
        }
        if pot[1] != 0.0 {
            let du = [
                -x * p * qr + alp3 * fi3 * sdcd,
                -y * p * qr + alp3 * fi1 * sdcd,
                -cc * p * qr + alp3 * fi5 * sdcd,
                -p * qr * a5 + alp3 * fj3 * sdcd,
                y * p * qrx + alp3 * fj1 * sdcd,
                cc * p * qrx + alp3 * fk3 * sdcd,
                -3.0 * x / r5 * vy + alp3 * fj1 * sdcd,
                -3.0 * y / r5 * vy - p * qr + alp3 * fj2 * sdcd,
                -3.0 * cc / r5 * vy + alp3 * fk1 * sdcd,
                -3.0 * x / r5 * vz - alp3 * fk3 * sdcd,
                -3.0 * y / r5 * vz - alp3 * fk1 * sdcd,
                -3.0 * cc / r5 * vz + alp3 * a3 / r3 * sdcd,
            ];
            accumulate(&mut u, &du, pot[1] / PI2);
        }
        if pot[2] != 0.0 {
            let du = [
                x * q * qr - alp3 * fi3 * sdsd,
                y * q * qr - alp3 * fi1 * sdsd,
                cc * q * qr - alp3 * fi5 * sdsd,
                q * qr * a5 - alp3 * fj3 * sdsd,
                -y * q * qrx - alp3 * fj1 * sdsd,
                -cc * q * qrx - alp3 * fk3 * sdsd,
                x * qr * wy - alp3 * fj1 * sdsd,
                qr * (y * wy + q) - alp3 * fj2 * sdsd,
                cc * qr * wy - alp3 * fk1 * sdsd,
                x * qr * wz + alp3 * fk3 * sdsd,
                y * qr * wz + alp3 * fk1 * sdsd,
                cc * qr * wz - alp3 * a3 / r3 * sdsd,
            ];
            accumulate(&mut u, &du, pot[2] / PI2);
        }
        if pot[3] != 0.0 {
            let du5 = -alp3 * 3.0 * xy / r5;
            let du6 = -alp3 * 3.0 * x * d / r5;
            let du9 = -alp3 * 3.0 * y * d / r5;
            let du = [
                alp3 * x / r3,
                alp3 * y / r3,
                alp3 * d / r3,
                alp3 * a3 / r3,
                du5,
                du6,
                du5,
                alp3 * b3 / r3,
                du9,
                -du6,
                -du9,
                -alp3 * c3 / r3,
            ];
            accumulate(&mut u, &du, pot[3] / PI2);
        }
        u
    }

    /// Depth-dependent terms of the point-source solution.
    fn uc0(&self, c: &Point, z: f64, pot: [f64; 4]) -> Output {
        let (sd, cd, sdsd, sdcd, s2d, c2d) =
            (self.sd, self.cd, self.sdsd, self.sdcd, self.s2d, self.c2d);
        let (alp4, alp5) = (self.alp4, self.alp5);
        let Point {
            x, y, d, p, q, s, t, xy, x2, y2, d2, r2, r3, r5, r7, a3, a5, c3, qr, qrx, ..
        } = *c;

        let cc = d + z;
        let q2 = q * q;
        let a7 = 1.0 - 7.0 * x2 / r2;
        let b5 = 1.0 - 5.0 * y2 / r2;
        let b7 = 1.0 - 7.0 * y2 / r2;
        let c5 = 1.0 - 5.0 * d2 / r2;
        let c7 = 1.0 - 7.0 * d2 / r2;
        let d7 = 2.0 - 7.0 * q2 / r2;
        let qr5 = 5.0 * q / r2;
        let qr7 = 7.0 * q / r2;
        let dr5 = 5.0 * d / r2;
        let mut u = [0.0; 12];

        if pot[0] != 0.0 {
            let du5 = 3.0 / r5 * (alp4 * y * a5 * cd + alp5 * cc * (a5 * sd - y * qr5 * a7));
            let du = [
                -alp4 * a3 / r3 * cd + alp5 * cc * qr * a5,
                3.0 * x / r5 * (alp4 * y * cd + alp5 * cc * (sd - y * qr5)),
                3.0 * x / r5 * (-alp4 * y * sd + alp5 * cc * (cd + d * qr5)),
                alp4 * 3.0 * x / r5 * (2.0 + a5) * cd - alp5 * cc * qrx * (2.0 + a7),
                du5,
                3.0 / r5 * (-alp4 * y * a5 * sd + alp5 * cc * (a5 * cd + d * qr5 * a7)),
                du5,
                3.0 * x / r5 * (alp4 * b5 * cd - alp5 * 5.0 * cc / r2 * (2.0 * y * sd + q * b7)),
                3.0 * x / r5
                    * (-alp4 * b5 * sd + alp5 * 5.0 * cc / r2 * (d * b7 * sd - y * c7 * cd)),
                3.0 / r5 * (-alp4 * d * a5 * cd + alp5 * cc * (a5 * cd + d * qr5 * a7)),
                15.0 * x / r7 * (alp4 * y * d * cd + alp5 * cc * (d * b7 * sd - y * c7 * cd)),
                15.0 * x / r7 * (-alp4 * y * d * sd + alp5 * cc * (2.0 * d * cd - q * c7)),
            ];
            accumulate(&mut u, &du, pot[0] / PI2);
        }
        if pot[1] != 0.0 {
            let du5 = 3.0 * x / r5
                * (alp4 * (c2d - 5.0 * y * t / r2) - alp5 * 5.0 * cc / r2 * (s - y * p * qr7));
            let du = [
                alp4 * 3.0 * x * t / r5 - alp5 * cc * p * qrx,
                -alp4 / r3 * (c2d - 3.0 * y * t / r2) + alp5 * 3.0 * cc / r5 * (s - y * p * qr5),
                -alp4 * a3 / r3 * sdcd + alp5 * 3.0 * cc / r5 * (t + d * p * qr5),
                alp4 * 3.0 * t / r5 * a5 - alp5 * 5.0 * cc * p * qr / r2 * a7,
                du5,
                3.0 * x / r5
                    * (alp4 * (2.0 + a5) * sdcd - alp5 * 5.0 * cc / r2 * (t + d * p * qr7)),
                du5,
                3.0 / r5
                    * (alp4 * (2.0 * y * c2d + t * b5)
                        + alp5 * cc * (s2d - 10.0 * y * s / r2 - p * qr5 * b7)),
                3.0 / r5
                    * (alp4 * y * a5 * sdcd
                        - alp5 * cc * ((3.0 + a5) * c2d + y * p * dr5 * qr7)),
                3.0 * x / r5
                    * (-alp4 * (s2d - t * dr5) - alp5 * 5.0 * cc / r2 * (t + d * p * qr7)),
                3.0 / r5
                    * (-alp4 * (d * b5 * c2d + y * c5 * s2d)
                        - alp5 * cc * ((3.0 + a5) * c2d + y * p * dr5 * qr7)),
                3.0 / r5
                    * (-alp4 * d * a5 * sdcd
                        - alp5 * cc * (s2d - 10.0 * d * t / r2 + p * qr5 * c7)),
            ];
            accumulate(&mut u, &du, pot[1] / PI2);
        }
        if pot[2] != 0.0 {
            let du5 = 3.0 * x / r5
                * (-alp4 * (s2d - 5.0 * y * s / r2)
                    - alp5 * 5.0 / r2 * (cc * (t - y + y * q * qr7) - y * z));
            let du = [
                3.0 * x / r5 * (-alp4 * s + alp5 * (cc * q * qr5 - z)),
                alp4 / r3 * (s2d - 3.0 * y * s / r2)
                    + alp5 * 3.0 / r5 * (cc * (t - y + y * q * qr5) - y * z),
                -alp4 / r3 * (1.0 - a3 * sdsd)
                    - alp5 * 3.0 / r5 * (cc * (s - d + d * q * qr5) - d * z),
                -alp4 * 3.0 * s / r5 * a5 + alp5 * (cc * qr * qr5 * a7 - 3.0 * z / r5 * a5),
                du5,
                3.0 * x / r5
                    * (alp4 * (1.0 - (2.0 + a5) * sdsd)
                        + alp5 * 5.0 / r2 * (cc * (s - d + d * q * qr7) - d * z)),
                du5,
                3.0 / r5
                    * (-alp4 * (2.0 * y * s2d + s * b5)
                        - alp5
                            * (cc * (2.0 * sdsd + 10.0 * y * (t - y) / r2 - q * qr5 * b7)
                                + z * b5)),
                3.0 / r5
                    * (alp4 * y * (1.0 - a5 * sdsd)
                        + alp5 * (cc * (3.0 + a5) * s2d - y * dr5 * (cc * d7 + z))),
                3.0 * x / r5
                    * (-alp4 * (c2d + s * dr5)
                        + alp5 * (5.0 * cc / r2 * (s - d + d * q * qr7) - 1.0 - z * dr5)),
                3.0 / r5
                    * (alp4 * (d * b5 * s2d - y * c5 * c2d)
                        + alp5 * (cc * ((3.0 + a5) * s2d - y * dr5 * d7) - y * (1.0 + z * dr5))),
                3.0 / r5
                    * (-alp4 * d * (1.0 - a5 * sdsd)
                        - alp5
                            * (cc * (c2d + 10.0 * d * (s - d) / r2 - q * qr5 * c7)
                                + z * (1.0 + c5))),
            ];
            accumulate(&mut u, &du, pot[2] / PI2);
        }
        if pot[3] != 0.0 {
            let du5 = -alp4 * 15.0 * xy * d / r7;
            let du6 = -alp4 * 3.0 * x / r5 * c5;
            let du9 = -alp4 * 3.0 * y / r5 * c5;
            let du = [
                alp4 * 3.0 * x * d / r5,
                alp4 * 3.0 * y * d / r5,
                alp4 * c3 / r3,
                alp4 * 3.0 * d / r5 * a5,
                du5,
                du6,
                du5,
                alp4 * 3.0 * d / r5 * b5,
                du9,
                du6,
                du9,
                alp4 * 3.0 * d / r5 * (2.0 + c5),
            ];
            accumulate(&mut u, &du, pot[3] / PI2);
        }
        u
    }
}

/// Flags selecting the limiting form of the logarithmic terms where
/// `R + ξ` or `R + η` vanishes.
fn log_flags(xi: [f64; 2], et: [f64; 2], q: f64) -> ([bool; 2], [bool; 2]) {
    let r12 = (xi[0] * xi[0] + et[1] * et[1] + q * q).sqrt();
    let r21 = (xi[1] * xi[1] + et[0] * et[0] + q * q).sqrt();
    let r22 = (xi[1] * xi[1] + et[1] * et[1] + q * q).sqrt();
    let kxi = [
        xi[0] < 0.0 && r21 + xi[1] < EPS,
        xi[0] < 0.0 && r22 + xi[1] < EPS,
    ];
    let ket = [
        et[0] < 0.0 && r12 + et[1] < EPS,
        et[0] < 0.0 && r22 + et[1] < EPS,
    ];
    (kxi, ket)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const ALPHA: f64 = 2.0 / 3.0;

    fn max_abs(u: &[f64]) -> f64 {
        u.iter().fold(0.0_f64, |m, v| m.max(v.abs()))
    }

    /// Central-difference check of the derivative block against displacement.
    fn check_derivatives(f: impl Fn([f64; 3]) -> Output, station: [f64; 3]) {
        let h = 1.0;
        let u0 = f(station);
        let scale = max_abs(&u0[3..]);
        for axis in 0..3 {
            let mut plus = station;
            let mut minus = station;
            plus[axis] += h;
            minus[axis] -= h;
            let up = f(plus);
            let um = f(minus);
            for comp in 0..3 {
                let numeric = (up[comp] - um[comp]) / (2.0 * h);
                let analytic = u0[3 + 3 * axis + comp];
                assert!(
                    (numeric - analytic).abs() <= 1e-4 * scale,
                    "d u{comp} / d x{axis}: analytic {analytic}, numeric {numeric}"
                );
            }
        }
    }

    #[test]
    fn test_zero_dislocation_gives_zero() {
        let k = Kernel::new(ALPHA, 45.0);
        let u = k
            .dc3d([1000.0, 2000.0, -500.0], 5000.0, [0.0, 3000.0], [-2000.0, 0.0], [0.0; 3])
            .unwrap();
        assert!(u.iter().all(|&v| v == 0.0));
        let u = k.dc3d0([1000.0, 2000.0, 0.0], 5000.0, [0.0; 4]).unwrap();
        assert!(u.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_linear_in_dislocation() {
        let k = Kernel::new(ALPHA, 70.0);
        let station = [3000.0, -1500.0, -800.0];
        let a = k
            .dc3d(station, 4000.0, [-2000.0, 2000.0], [-3000.0, 0.0], [1.0, 0.0, 0.0])
            .unwrap();
        let b = k
            .dc3d(station, 4000.0, [-2000.0, 2000.0], [-3000.0, 0.0], [0.0, 1.0, 0.0])
            .unwrap();
        let ab = k
            .dc3d(station, 4000.0, [-2000.0, 2000.0], [-3000.0, 0.0], [2.0, -3.0, 0.0])
            .unwrap();
        for i in 0..12 {
            assert_relative_eq!(ab[i], 2.0 * a[i] - 3.0 * b[i], epsilon = 1e-15, max_relative = 1e-10);
        }
    }

    #[test]
    fn test_vertical_strike_slip_surface_symmetry() {
        // Left-lateral slip on a vertical fault along x: the block at +y moves
        // toward -x, the block at -y toward +x.
        let k = Kernel::new(ALPHA, 90.0);
        let al = [-5000.0, 5000.0];
        let aw = [-10000.0, 0.0];
        let north = k.dc3d([0.0, 2000.0, 0.0], 0.0, al, aw, [1.0, 0.0, 0.0]).unwrap();
        let south = k.dc3d([0.0, -2000.0, 0.0], 0.0, al, aw, [1.0, 0.0, 0.0]).unwrap();
        assert!(north[0] < 0.0);
        assert_relative_eq!(north[0], -south[0], max_relative = 1e-10);
        assert!(north[1].abs() < 1e-12);
        assert!(north[2].abs() < 1e-12);
    }

    #[test]
    fn test_thrust_uplifts_hanging_wall() {
        let k = Kernel::new(ALPHA, 30.0);
        // Fault dips toward -y with its updip edge near y = 4.3 km; the
        // station sits above the plane on the hanging wall
        let u = k
            .dc3d([0.0, 2000.0, 0.0], 5000.0, [-10000.0, 10000.0], [-5000.0, 5000.0], [0.0, 1.0, 0.0])
            .unwrap();
        assert!(u[2] > 0.0);
    }

    #[test]
    fn test_observation_on_fault_is_singular() {
        let k = Kernel::new(ALPHA, 90.0);
        // Surface trace of a vertical fault reaching the surface
        let u = k.dc3d([1000.0, 0.0, 0.0], 0.0, [0.0, 5000.0], [-5000.0, 0.0], [1.0, 0.0, 0.0]);
        assert!(u.is_none());
        // Interior of a buried fault plane
        let u = k.dc3d([1000.0, 0.0, -3000.0], 0.0, [0.0, 5000.0], [-5000.0, 0.0], [1.0, 0.0, 0.0]);
        assert!(u.is_none());
        // Point source location
        assert!(k.dc3d0([0.0, 0.0, -4000.0], 4000.0, [1.0, 0.0, 0.0, 0.0]).is_none());
    }

    #[test]
    fn test_finite_derivatives_match_finite_differences() {
        let k = Kernel::new(ALPHA, 55.0);
        for disl in [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]] {
            let f = |s: [f64; 3]| {
                k.dc3d(s, 6000.0, [-4000.0, 4000.0], [-3000.0, 3000.0], disl)
                    .unwrap()
            };
            check_derivatives(f, [2500.0, 4000.0, -2000.0]);
            check_derivatives(f, [-7000.0, -1500.0, -1.0]);
        }
    }

    #[test]
    fn test_point_derivatives_match_finite_differences() {
        let k = Kernel::new(ALPHA, 35.0);
        for pot in [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ] {
            let f = |s: [f64; 3]| k.dc3d0(s, 7000.0, pot).unwrap();
            check_derivatives(f, [3000.0, -2000.0, -1500.0]);
            check_derivatives(f, [-4000.0, 5000.0, -1.0]);
        }
    }

    #[test]
    fn test_small_patch_matches_point_source() {
        let k = Kernel::new(ALPHA, 60.0);
        let side = 200.0;
        let depth = 8000.0;
        // Finite patch centred on the point source origin
        let station = [4000.0, 5000.0, 0.0];
        let finite = k
            .dc3d(station, depth, [-side / 2.0, side / 2.0], [-side / 2.0, side / 2.0], [1.0, 1.0, 0.0])
            .unwrap();
        let area = side * side;
        let point = k.dc3d0(station, depth, [area, area, 0.0, 0.0]).unwrap();
        let scale = max_abs(&point[..3]);
        for i in 0..3 {
            assert!((finite[i] - point[i]).abs() < 1e-2 * scale, "component {i}");
        }
    }

    #[test]
    fn test_vertical_dip_matches_near_vertical() {
        let vertical = Kernel::new(ALPHA, 90.0);
        let near = Kernel::new(ALPHA, 89.99);
        let args = ([2000.0, 1500.0, -500.0], 3000.0, [-3000.0, 3000.0], [-2000.0, 0.0]);
        for disl in [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]] {
            let a = vertical.dc3d(args.0, args.1, args.2, args.3, disl).unwrap();
            let b = near.dc3d(args.0, args.1, args.2, args.3, disl).unwrap();
            let scale = max_abs(&a);
            for i in 0..12 {
                assert!((a[i] - b[i]).abs() < 1e-3 * scale, "component {i}");
            }
        }
    }
}
