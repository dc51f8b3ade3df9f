//! Surface-temperature retrieval (Landsat thermal bands).
//!
//! Two stages: rescale the integer-encoded thermal products to physical
//! units, then invert at-sensor radiance to surface temperature with the
//! single-channel formula of Sekertekin & Bonafoni (2020),
//! <https://doi.org/10.3390/rs12020294>.

use playa_engine::{Image, Operand};

/// Calibration constants for the Landsat 8/9 thermal band.
const K1: f64 = 774.89;
const K2: f64 = 1321.08;

/// Transmittance/emissivity scale factor.
const SCALE_FRACTION: f64 = 0.0001;
/// Radiance scale factor (W m⁻² sr⁻¹ μm⁻¹ per count).
const SCALE_RADIANCE: f64 = 0.001;

const FRACTION_BANDS: [&str; 2] = ["ST_ATRAN", "ST_EMIS"];
const FRACTION_NAMES: [&str; 2] = ["transmittance", "emissivity"];
const RADIANCE_BANDS: [&str; 3] = ["ST_DRAD", "ST_TRAD", "ST_URAD"];
const RADIANCE_NAMES: [&str; 3] = ["downwelling", "B10_radiance", "upwelling"];

/// Rescale the raw thermal bands to physical units, appending them under
/// their semantic names.
pub fn scaled_temperature_bands(image: &Image) -> Image {
    let fractions = image
        .select(&FRACTION_BANDS)
        .multiply(SCALE_FRACTION)
        .rename(&FRACTION_NAMES);
    let radiances = image
        .select(&RADIANCE_BANDS)
        .multiply(SCALE_RADIANCE)
        .rename(&RADIANCE_NAMES);
    image
        .add_bands(&fractions)
        .add_bands(&radiances)
        .copy_properties(image)
}

/// Invert at-sensor radiance to surface temperature in Celsius, appending a
/// band named `LST`. Expects the semantic bands produced by
/// [`scaled_temperature_bands`].
pub fn surface_temperature(image: &Image) -> Image {
    let lst = image.expression(
        "(k2/log((k1/((B10_rad - upwelling - transmittance*(1 - emissivity)*downwelling)/(transmittance*emissivity)))+1)) - 273.15",
        &[
            ("k1", Operand::Number(K1)),
            ("k2", Operand::Number(K2)),
            ("B10_rad", Operand::from(&image.select(&["B10_radiance"]))),
            ("upwelling", Operand::from(&image.select(&["upwelling"]))),
            ("transmittance", Operand::from(&image.select(&["transmittance"]))),
            ("emissivity", Operand::from(&image.select(&["emissivity"]))),
            ("downwelling", Operand::from(&image.select(&["downwelling"]))),
        ],
    );
    image.add_bands(&lst.rename(&["LST"])).copy_properties(image)
}

/// Blackbody at-sensor radiance for a surface temperature in Celsius, under
/// unit transmittance/emissivity and zero path radiance. Inverse of the
/// retrieval formula; used to build synthetic fixtures.
pub fn blackbody_radiance(celsius: f64) -> f64 {
    K1 / ((K2 / (celsius + 273.15)).exp() - 1.0)
}
