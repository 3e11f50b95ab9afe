//! Per-brush tunables.
//!
//! [`BrushSettings`] is a sparse document: every key is optional, and hosts
//! usually set only a handful. Painting code reads values through the
//! accessor methods, which fill in the built-in defaults, so a brush never
//! sees a missing key. Documents merge shallowly, last writer wins per key.

use crate::color::Rgba;
use serde::{Deserialize, Serialize};

/// Fallback swatches for palette-driven brushes (confetti, mosaic tints).
const DEFAULT_PALETTE: [&str; 5] = ["#ff5252", "#ffd740", "#40c4ff", "#69f0ae", "#e040fb"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushSettings {
    // Shared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,

    // Scatter family
    #[serde(skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scatter_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub particle_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_jitter: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha_falloff: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grain_spread: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grain_stretch: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speck_alpha: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dot_spacing: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smoke_drift: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smoke_softness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sparkle_chance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bubble_max_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bubble_outline_alpha: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confetti_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palette: Option<Vec<String>>,

    // Bristle and hair family
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bristle_count: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bristle_spread: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bristle_alpha: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_falloff: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nib_angle_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nib_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ink_bleed_chance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ink_bleed_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_jitter: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bloom_passes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bloom_offset: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bloom_alpha_decay: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graphite_jitter: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pen_feather: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chalk_roughness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dust_density: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charcoal_layers: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smudge_alpha: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wax_gap_chance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wax_edge_darken: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hair_length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hair_count: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hair_curl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blade_length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blade_count: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blade_bend: Option<f64>,

    // Fractal family
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bolt_roughness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bolt_min_offset: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_chance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_scale: Option<f64>,

    // Rainbow
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hue_period_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hue_distance_scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rainbow_saturation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rainbow_lightness: Option<f64>,

    // Glow family
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glow_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glow_strength: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub core_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub star_points: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twinkle_chance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trail_length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trail_decay: Option<f64>,

    // Quantized family
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixel_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grout: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_jitter: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dot_gap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dot_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wave_amplitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wave_frequency: Option<f64>,
}

macro_rules! setting {
    ($field:ident, $default:expr) => {
        pub fn $field(&self) -> f64 {
            self.$field.unwrap_or($default)
        }
    };
}

macro_rules! setting_count {
    ($field:ident, $default:expr) => {
        pub fn $field(&self) -> usize {
            self.$field.map(|v| v.max(1.0) as usize).unwrap_or($default)
        }
    };
}

impl BrushSettings {
    setting!(opacity, 1.0);

    setting!(density, 12.0);
    setting!(scatter_radius, 6.0);
    setting!(particle_size, 1.6);
    setting!(size_jitter, 0.5);
    setting!(alpha_falloff, 0.65);
    setting!(grain_spread, 5.0);
    setting!(grain_stretch, 2.2);
    setting!(speck_alpha, 0.18);
    setting!(dot_spacing, 4.0);
    setting!(smoke_drift, 3.0);
    setting!(smoke_softness, 0.35);
    setting!(sparkle_chance, 0.2);
    setting!(bubble_max_radius, 7.0);
    setting!(bubble_outline_alpha, 0.5);
    setting!(confetti_size, 3.2);

    setting_count!(bristle_count, 10);
    setting!(bristle_spread, 0.9);
    setting!(bristle_alpha, 0.3);
    setting!(edge_falloff, 0.5);
    setting!(nib_angle_deg, 45.0);
    setting!(nib_ratio, 0.25);
    setting!(ink_bleed_chance, 0.15);
    setting!(ink_bleed_radius, 2.5);
    setting!(flow_jitter, 0.25);
    setting_count!(bloom_passes, 3);
    setting!(bloom_offset, 2.5);
    setting!(bloom_alpha_decay, 0.55);
    setting!(graphite_jitter, 0.8);
    setting!(pen_feather, 0.6);
    setting!(chalk_roughness, 1.4);
    setting!(dust_density, 0.5);
    setting_count!(charcoal_layers, 3);
    setting!(smudge_alpha, 0.12);
    setting!(wax_gap_chance, 0.18);
    setting!(wax_edge_darken, 0.25);
    setting!(hair_length, 9.0);
    setting_count!(hair_count, 14);
    setting!(hair_curl, 0.6);
    setting!(blade_length, 12.0);
    setting_count!(blade_count, 5);
    setting!(blade_bend, 0.45);

    setting!(bolt_roughness, 0.45);
    setting!(bolt_min_offset, 1.5);
    setting!(branch_chance, 0.12);
    setting!(branch_scale, 0.5);

    setting!(hue_period_ms, 1800.0);
    setting!(hue_distance_scale, 1.2);
    setting!(rainbow_saturation, 0.9);
    setting!(rainbow_lightness, 0.6);

    setting!(glow_radius, 12.0);
    setting!(glow_strength, 0.85);
    setting!(core_ratio, 0.45);
    setting_count!(star_points, 5);
    setting!(twinkle_chance, 0.25);
    setting_count!(trail_length, 5);
    setting!(trail_decay, 0.55);

    setting!(pixel_size, 6.0);
    setting!(cell_size, 10.0);
    setting!(grout, 1.5);
    setting!(color_jitter, 0.15);
    setting!(dot_gap, 9.0);
    setting!(dot_radius, 2.2);
    setting!(wave_amplitude, 6.0);
    setting!(wave_frequency, 0.05);

    /// Palette swatches as parsed colors. Unparseable entries are dropped;
    /// an empty or missing palette falls back to the built-in one.
    pub fn palette_colors(&self) -> Vec<Rgba> {
        let parsed: Vec<Rgba> = self
            .palette
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .filter_map(|hex| Rgba::from_hex(hex).ok())
            .collect();
        if !parsed.is_empty() {
            return parsed;
        }
        DEFAULT_PALETTE
            .iter()
            .filter_map(|hex| Rgba::from_hex(hex).ok())
            .collect()
    }

    /// Shallow merge: keys set in `overrides` win, everything else keeps
    /// the value from `self`.
    pub fn merged(&self, overrides: &BrushSettings) -> BrushSettings {
        macro_rules! pick {
            ($field:ident) => {
                overrides.$field.clone().or_else(|| self.$field.clone())
            };
        }
        BrushSettings {
            opacity: pick!(opacity),
            density: pick!(density),
            scatter_radius: pick!(scatter_radius),
            particle_size: pick!(particle_size),
            size_jitter: pick!(size_jitter),
            alpha_falloff: pick!(alpha_falloff),
            grain_spread: pick!(grain_spread),
            grain_stretch: pick!(grain_stretch),
            speck_alpha: pick!(speck_alpha),
            dot_spacing: pick!(dot_spacing),
            smoke_drift: pick!(smoke_drift),
            smoke_softness: pick!(smoke_softness),
            sparkle_chance: pick!(sparkle_chance),
            bubble_max_radius: pick!(bubble_max_radius),
            bubble_outline_alpha: pick!(bubble_outline_alpha),
            confetti_size: pick!(confetti_size),
            palette: pick!(palette),
            bristle_count: pick!(bristle_count),
            bristle_spread: pick!(bristle_spread),
            bristle_alpha: pick!(bristle_alpha),
            edge_falloff: pick!(edge_falloff),
            nib_angle_deg: pick!(nib_angle_deg),
            nib_ratio: pick!(nib_ratio),
            ink_bleed_chance: pick!(ink_bleed_chance),
            ink_bleed_radius: pick!(ink_bleed_radius),
            flow_jitter: pick!(flow_jitter),
            bloom_passes: pick!(bloom_passes),
            bloom_offset: pick!(bloom_offset),
            bloom_alpha_decay: pick!(bloom_alpha_decay),
            graphite_jitter: pick!(graphite_jitter),
            pen_feather: pick!(pen_feather),
            chalk_roughness: pick!(chalk_roughness),
            dust_density: pick!(dust_density),
            charcoal_layers: pick!(charcoal_layers),
            smudge_alpha: pick!(smudge_alpha),
            wax_gap_chance: pick!(wax_gap_chance),
            wax_edge_darken: pick!(wax_edge_darken),
            hair_length: pick!(hair_length),
            hair_count: pick!(hair_count),
            hair_curl: pick!(hair_curl),
            blade_length: pick!(blade_length),
            blade_count: pick!(blade_count),
            blade_bend: pick!(blade_bend),
            bolt_roughness: pick!(bolt_roughness),
            bolt_min_offset: pick!(bolt_min_offset),
            branch_chance: pick!(branch_chance),
            branch_scale: pick!(branch_scale),
            hue_period_ms: pick!(hue_period_ms),
            hue_distance_scale: pick!(hue_distance_scale),
            rainbow_saturation: pick!(rainbow_saturation),
            rainbow_lightness: pick!(rainbow_lightness),
            glow_radius: pick!(glow_radius),
            glow_strength: pick!(glow_strength),
            core_ratio: pick!(core_ratio),
            star_points: pick!(star_points),
            twinkle_chance: pick!(twinkle_chance),
            trail_length: pick!(trail_length),
            trail_decay: pick!(trail_decay),
            pixel_size: pick!(pixel_size),
            cell_size: pick!(cell_size),
            grout: pick!(grout),
            color_jitter: pick!(color_jitter),
            dot_gap: pick!(dot_gap),
            dot_radius: pick!(dot_radius),
            wave_amplitude: pick!(wave_amplitude),
            wave_frequency: pick!(wave_frequency),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_fall_back_to_defaults() {
        let settings = BrushSettings::default();
        assert_eq!(settings.density(), 12.0);
        assert_eq!(settings.bristle_count(), 10);
        assert_eq!(settings.opacity(), 1.0);
    }

    #[test]
    fn test_accessors_prefer_explicit_values() {
        let settings = BrushSettings {
            density: Some(40.0),
            bristle_count: Some(3.7),
            ..Default::default()
        };
        assert_eq!(settings.density(), 40.0);
        assert_eq!(settings.bristle_count(), 3);
    }

    #[test]
    fn test_merge_is_shallow_and_override_wins() {
        let base = BrushSettings {
            density: Some(20.0),
            scatter_radius: Some(4.0),
            ..Default::default()
        };
        let overrides = BrushSettings {
            density: Some(5.0),
            glow_radius: Some(30.0),
            ..Default::default()
        };
        let merged = base.merged(&overrides);
        assert_eq!(merged.density, Some(5.0));
        assert_eq!(merged.scatter_radius, Some(4.0));
        assert_eq!(merged.glow_radius, Some(30.0));
        assert_eq!(merged.particle_size, None);
    }

    #[test]
    fn test_partial_json_document_deserializes() {
        let settings: BrushSettings =
            serde_json::from_str(r##"{"density": 25.0, "palette": ["#102030"]}"##)
                .expect("partial document");
        assert_eq!(settings.density, Some(25.0));
        assert_eq!(settings.palette_colors(), vec![Rgba::from_hex("#102030").unwrap()]);
        assert_eq!(settings.smoke_drift, None);
    }

    #[test]
    fn test_serialization_skips_unset_keys() {
        let settings = BrushSettings {
            wave_amplitude: Some(9.0),
            ..Default::default()
        };
        let json = serde_json::to_string(&settings).expect("serialize");
        assert_eq!(json, r#"{"wave_amplitude":9.0}"#);
    }

    #[test]
    fn test_bad_palette_entries_fall_back() {
        let settings = BrushSettings {
            palette: Some(vec!["oops".into()]),
            ..Default::default()
        };
        assert_eq!(settings.palette_colors().len(), DEFAULT_PALETTE.len());
    }
}
