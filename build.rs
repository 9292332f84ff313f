//! Generates the calibration tables used by `src/calibration`.
//!
//! Color curves crossfade cold -> normal -> warm emitters with constant
//! power. Brightness curves follow CIE 1931 lightness, scaled per emitter
//! so that all three reach the same perceived output at full level.

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const MIN_TEMPERATURE: u16 = 153;
const MAX_TEMPERATURE: u16 = 454;

/// Native color temperature of each emitter, in mireds.
const COLD_MIREDS: f64 = 153.0;
const NORMAL_MIREDS: f64 = 250.0;
const WARM_MIREDS: f64 = 370.0;

/// Relative efficiency compensation per emitter (normal, cold, warm).
const BRIGHTNESS_SCALE: [f64; 3] = [0.96, 0.92, 1.0];

fn crossfade(position: f64) -> (f64, f64) {
    let angle = position.clamp(0.0, 1.0) * core::f64::consts::FRAC_PI_2;
    (angle.cos(), angle.sin())
}

/// Returns (normal, cold, warm) intensities for a color temperature.
fn color_point(mireds: f64) -> (f64, f64, f64) {
    if mireds <= NORMAL_MIREDS {
        let (cold, normal) = crossfade((mireds - COLD_MIREDS) / (NORMAL_MIREDS - COLD_MIREDS));
        (normal, cold, 0.0)
    } else if mireds <= WARM_MIREDS {
        let (normal, warm) = crossfade((mireds - NORMAL_MIREDS) / (WARM_MIREDS - NORMAL_MIREDS));
        (normal, 0.0, warm)
    } else {
        // Below the warm emitter's native point, dim it slightly towards the red end.
        let position = (mireds - WARM_MIREDS) / (f64::from(MAX_TEMPERATURE) - WARM_MIREDS);
        (0.0, 0.0, 1.0 - 0.15 * position)
    }
}

fn cie_lightness(level: u16) -> f64 {
    if level == 0 {
        return 0.0;
    }
    let lightness = f64::from(level.min(254)) / 254.0 * 100.0;
    if lightness <= 8.0 {
        lightness / 903.3
    } else {
        ((lightness + 16.0) / 116.0).powi(3)
    }
}

fn write_table(out: &mut String, name: &str, values: &[f64]) {
    writeln!(out, "pub(super) static {name}: [f32; {}] = [", values.len()).unwrap();
    for chunk in values.chunks(8) {
        out.push_str("   ");
        for value in chunk {
            write!(out, " {value:.6},").unwrap();
        }
        out.push('\n');
    }
    out.push_str("];\n\n");
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let temperatures: Vec<(f64, f64, f64)> = (MIN_TEMPERATURE..=MAX_TEMPERATURE)
        .map(|mireds| color_point(f64::from(mireds)))
        .collect();
    let brightness: Vec<f64> = (0..=255u16).map(cie_lightness).collect();

    let mut out = String::new();
    out.push_str("// @generated by build.rs\n\n");
    write_table(
        &mut out,
        "COLOR_NORMAL",
        &temperatures.iter().map(|point| point.0).collect::<Vec<_>>(),
    );
    write_table(
        &mut out,
        "COLOR_COLD",
        &temperatures.iter().map(|point| point.1).collect::<Vec<_>>(),
    );
    write_table(
        &mut out,
        "COLOR_WARM",
        &temperatures.iter().map(|point| point.2).collect::<Vec<_>>(),
    );
    for (name, scale) in ["BRIGHTNESS_NORMAL", "BRIGHTNESS_COLD", "BRIGHTNESS_WARM"]
        .iter()
        .zip(BRIGHTNESS_SCALE)
    {
        let scaled: Vec<f64> = brightness.iter().map(|value| value * scale).collect();
        write_table(&mut out, name, &scaled);
    }

    let out_dir = env::var("OUT_DIR").unwrap();
    fs::write(Path::new(&out_dir).join("calibration_tables.rs"), out).unwrap();
}
