// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device property names and the sparse property record.
//!
//! The lamp reports state as flat key/value pairs. [`PropertyName`] is the
//! closed set of keys this crate understands, and [`DeviceProperty`] is a
//! record holding a typed, optional slot per key. Every field is `None`
//! until the device has reported a value for it, so a record doubles as a
//! snapshot (most fields set) and as a change set (only touched fields set).
//!
//! Raw values arrive in two shapes. Notifications carry JSON numbers and
//! strings; `get_prop` replies carry strings only, even for numeric
//! properties. [`DeviceProperty::set_raw`] accepts both and drops anything
//! it cannot coerce, keeping malformed reports out of the cache.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::ValueError;
use crate::types::{Brightness, ColorMode, ColorTemperature, Hue, Power, Rgb, Saturation};

/// A state property the lamp can report.
///
/// Variant order matches the wire catalogue; [`PropertyName::as_str`]
/// yields the exact key used in `get_prop` requests and notification
/// payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyName {
    /// Device model identifier, e.g. `lamp15`.
    Model,
    /// User-assigned device name.
    Name,
    /// Main light power state.
    Power,
    /// Combined power state of main and background light.
    MainPower,
    /// Main light brightness, percent.
    Bright,
    /// Main light color temperature, kelvin.
    Ct,
    /// Main light RGB value (unused by the screen light bar).
    Rgb,
    /// Main light hue (unused by the screen light bar).
    Hue,
    /// Main light saturation (unused by the screen light bar).
    Sat,
    /// Main light color mode.
    ColorMode,
    /// Whether a color flow is running on the main light.
    Flowing,
    /// Remaining sleep-timer minutes.
    Delayoff,
    /// Active color flow expression for the main light.
    FlowParams,
    /// Whether music mode is active.
    MusicOn,
    /// Background light power state.
    BgPower,
    /// Whether a color flow is running on the background light.
    BgFlowing,
    /// Active color flow expression for the background light.
    BgFlowParams,
    /// Background light color temperature, kelvin.
    BgCt,
    /// Background light color mode.
    BgLmode,
    /// Background light brightness, percent.
    BgBright,
    /// Background light RGB value.
    BgRgb,
    /// Background light hue.
    BgHue,
    /// Background light saturation.
    BgSat,
    /// Night light brightness (unused by the screen light bar).
    NlBr,
    /// Whether the night light mode is active.
    ActiveMode,
}

impl PropertyName {
    /// Every property name, in wire catalogue order.
    pub const ALL: [Self; 25] = [
        Self::Model,
        Self::Name,
        Self::Power,
        Self::MainPower,
        Self::Bright,
        Self::Ct,
        Self::Rgb,
        Self::Hue,
        Self::Sat,
        Self::ColorMode,
        Self::Flowing,
        Self::Delayoff,
        Self::FlowParams,
        Self::MusicOn,
        Self::BgPower,
        Self::BgFlowing,
        Self::BgFlowParams,
        Self::BgCt,
        Self::BgLmode,
        Self::BgBright,
        Self::BgRgb,
        Self::BgHue,
        Self::BgSat,
        Self::NlBr,
        Self::ActiveMode,
    ];

    /// Returns the wire key for this property.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Name => "name",
            Self::Power => "power",
            Self::MainPower => "main_power",
            Self::Bright => "bright",
            Self::Ct => "ct",
            Self::Rgb => "rgb",
            Self::Hue => "hue",
            Self::Sat => "sat",
            Self::ColorMode => "color_mode",
            Self::Flowing => "flowing",
            Self::Delayoff => "delayoff",
            Self::FlowParams => "flow_params",
            Self::MusicOn => "music_on",
            Self::BgPower => "bg_power",
            Self::BgFlowing => "bg_flowing",
            Self::BgFlowParams => "bg_flow_params",
            Self::BgCt => "bg_ct",
            Self::BgLmode => "bg_lmode",
            Self::BgBright => "bg_bright",
            Self::BgRgb => "bg_rgb",
            Self::BgHue => "bg_hue",
            Self::BgSat => "bg_sat",
            Self::NlBr => "nl_br",
            Self::ActiveMode => "active_mode",
        }
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyName {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "model" => Ok(Self::Model),
            "name" => Ok(Self::Name),
            "power" => Ok(Self::Power),
            "main_power" => Ok(Self::MainPower),
            "bright" => Ok(Self::Bright),
            "ct" => Ok(Self::Ct),
            "rgb" => Ok(Self::Rgb),
            "hue" => Ok(Self::Hue),
            "sat" => Ok(Self::Sat),
            "color_mode" => Ok(Self::ColorMode),
            "flowing" => Ok(Self::Flowing),
            "delayoff" => Ok(Self::Delayoff),
            "flow_params" => Ok(Self::FlowParams),
            "music_on" => Ok(Self::MusicOn),
            "bg_power" => Ok(Self::BgPower),
            "bg_flowing" => Ok(Self::BgFlowing),
            "bg_flow_params" => Ok(Self::BgFlowParams),
            "bg_ct" => Ok(Self::BgCt),
            "bg_lmode" => Ok(Self::BgLmode),
            "bg_bright" => Ok(Self::BgBright),
            "bg_rgb" => Ok(Self::BgRgb),
            "bg_hue" => Ok(Self::BgHue),
            "bg_sat" => Ok(Self::BgSat),
            "nl_br" => Ok(Self::NlBr),
            "active_mode" => Ok(Self::ActiveMode),
            other => Err(ValueError::UnknownProperty(other.to_string())),
        }
    }
}

/// Properties polled on every state refresh.
///
/// Covers everything the screen light bar actually changes at runtime;
/// static properties such as `model` are fetched once during the
/// connection handshake.
pub const STATE_PROPS: [PropertyName; 9] = [
    PropertyName::Power,
    PropertyName::Bright,
    PropertyName::Ct,
    PropertyName::BgPower,
    PropertyName::BgLmode,
    PropertyName::BgBright,
    PropertyName::BgRgb,
    PropertyName::BgHue,
    PropertyName::BgSat,
];

/// Sparse, typed record of device properties.
///
/// Fields mirror [`PropertyName`] one to one. A `None` field means the
/// value is unknown (never reported, or the last report failed coercion),
/// not that the device lacks the feature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceProperty {
    pub model: Option<String>,
    pub name: Option<String>,
    pub power: Option<Power>,
    pub main_power: Option<Power>,
    pub bright: Option<Brightness>,
    pub ct: Option<ColorTemperature>,
    pub rgb: Option<Rgb>,
    pub hue: Option<Hue>,
    pub sat: Option<Saturation>,
    pub color_mode: Option<ColorMode>,
    pub flowing: Option<i64>,
    pub delayoff: Option<i64>,
    pub flow_params: Option<i64>,
    pub music_on: Option<i64>,
    pub bg_power: Option<Power>,
    pub bg_flowing: Option<i64>,
    pub bg_flow_params: Option<i64>,
    pub bg_ct: Option<ColorTemperature>,
    pub bg_lmode: Option<ColorMode>,
    pub bg_bright: Option<Brightness>,
    pub bg_rgb: Option<Rgb>,
    pub bg_hue: Option<Hue>,
    pub bg_sat: Option<Saturation>,
    pub nl_br: Option<i64>,
    pub active_mode: Option<i64>,
}

impl DeviceProperty {
    /// Coerces a raw JSON value into the typed slot for `name`.
    ///
    /// Returns `true` if the field was updated. Values that fail coercion
    /// (wrong JSON type, number out of the property's range) leave the
    /// field untouched and return `false`, so a single bad report cannot
    /// poison the cache.
    pub fn set_raw(&mut self, name: PropertyName, value: &Value) -> bool {
        match name {
            PropertyName::Model => assign(&mut self.model, text_of(value)),
            PropertyName::Name => assign(&mut self.name, text_of(value)),
            PropertyName::Power => assign(&mut self.power, power_of(value)),
            PropertyName::MainPower => assign(&mut self.main_power, power_of(value)),
            PropertyName::Bright => {
                assign(&mut self.bright, int_of(value).and_then(brightness_of))
            }
            PropertyName::Ct => assign(&mut self.ct, int_of(value).and_then(color_temp_of)),
            PropertyName::Rgb => assign(&mut self.rgb, int_of(value).and_then(rgb_of)),
            PropertyName::Hue => assign(&mut self.hue, int_of(value).and_then(hue_of)),
            PropertyName::Sat => assign(&mut self.sat, int_of(value).and_then(saturation_of)),
            PropertyName::ColorMode => {
                assign(&mut self.color_mode, int_of(value).and_then(ColorMode::from_raw))
            }
            PropertyName::Flowing => assign(&mut self.flowing, int_of(value)),
            PropertyName::Delayoff => assign(&mut self.delayoff, int_of(value)),
            PropertyName::FlowParams => assign(&mut self.flow_params, int_of(value)),
            PropertyName::MusicOn => assign(&mut self.music_on, int_of(value)),
            PropertyName::BgPower => assign(&mut self.bg_power, power_of(value)),
            PropertyName::BgFlowing => assign(&mut self.bg_flowing, int_of(value)),
            PropertyName::BgFlowParams => assign(&mut self.bg_flow_params, int_of(value)),
            PropertyName::BgCt => assign(&mut self.bg_ct, int_of(value).and_then(color_temp_of)),
            PropertyName::BgLmode => {
                assign(&mut self.bg_lmode, int_of(value).and_then(ColorMode::from_raw))
            }
            PropertyName::BgBright => {
                assign(&mut self.bg_bright, int_of(value).and_then(brightness_of))
            }
            PropertyName::BgRgb => assign(&mut self.bg_rgb, int_of(value).and_then(rgb_of)),
            PropertyName::BgHue => assign(&mut self.bg_hue, int_of(value).and_then(hue_of)),
            PropertyName::BgSat => assign(&mut self.bg_sat, int_of(value).and_then(saturation_of)),
            PropertyName::NlBr => assign(&mut self.nl_br, int_of(value)),
            PropertyName::ActiveMode => assign(&mut self.active_mode, int_of(value)),
        }
    }

    /// Copies every populated field of `other` over the matching field of
    /// `self`. Fields `other` leaves at `None` are untouched.
    pub fn merge_from(&mut self, other: &Self) {
        merge_clone(&mut self.model, &other.model);
        merge_clone(&mut self.name, &other.name);
        merge_copy(&mut self.power, other.power);
        merge_copy(&mut self.main_power, other.main_power);
        merge_copy(&mut self.bright, other.bright);
        merge_copy(&mut self.ct, other.ct);
        merge_copy(&mut self.rgb, other.rgb);
        merge_copy(&mut self.hue, other.hue);
        merge_copy(&mut self.sat, other.sat);
        merge_copy(&mut self.color_mode, other.color_mode);
        merge_copy(&mut self.flowing, other.flowing);
        merge_copy(&mut self.delayoff, other.delayoff);
        merge_copy(&mut self.flow_params, other.flow_params);
        merge_copy(&mut self.music_on, other.music_on);
        merge_copy(&mut self.bg_power, other.bg_power);
        merge_copy(&mut self.bg_flowing, other.bg_flowing);
        merge_copy(&mut self.bg_flow_params, other.bg_flow_params);
        merge_copy(&mut self.bg_ct, other.bg_ct);
        merge_copy(&mut self.bg_lmode, other.bg_lmode);
        merge_copy(&mut self.bg_bright, other.bg_bright);
        merge_copy(&mut self.bg_rgb, other.bg_rgb);
        merge_copy(&mut self.bg_hue, other.bg_hue);
        merge_copy(&mut self.bg_sat, other.bg_sat);
        merge_copy(&mut self.nl_br, other.nl_br);
        merge_copy(&mut self.active_mode, other.active_mode);
    }

    /// Computes the change set from `previous` to `self`.
    ///
    /// A field appears in the result only when it is populated in `self`
    /// and differs from `previous`. Fields the background light cannot
    /// express in its current color mode are dropped: hue and saturation
    /// while it renders color temperature, and color temperature while it
    /// renders RGB or HSV. The lamp keeps echoing stale values for those
    /// and reporting them as changes would be noise.
    #[must_use]
    pub fn diff(&self, previous: &Self) -> Self {
        let mut changed = Self::default();
        diff_clone(&mut changed.model, &self.model, &previous.model);
        diff_clone(&mut changed.name, &self.name, &previous.name);
        diff_copy(&mut changed.power, self.power, previous.power);
        diff_copy(&mut changed.main_power, self.main_power, previous.main_power);
        diff_copy(&mut changed.bright, self.bright, previous.bright);
        diff_copy(&mut changed.ct, self.ct, previous.ct);
        diff_copy(&mut changed.rgb, self.rgb, previous.rgb);
        diff_copy(&mut changed.hue, self.hue, previous.hue);
        diff_copy(&mut changed.sat, self.sat, previous.sat);
        diff_copy(&mut changed.color_mode, self.color_mode, previous.color_mode);
        diff_copy(&mut changed.flowing, self.flowing, previous.flowing);
        diff_copy(&mut changed.delayoff, self.delayoff, previous.delayoff);
        diff_copy(&mut changed.flow_params, self.flow_params, previous.flow_params);
        diff_copy(&mut changed.music_on, self.music_on, previous.music_on);
        diff_copy(&mut changed.bg_power, self.bg_power, previous.bg_power);
        diff_copy(&mut changed.bg_flowing, self.bg_flowing, previous.bg_flowing);
        diff_copy(&mut changed.bg_flow_params, self.bg_flow_params, previous.bg_flow_params);
        diff_copy(&mut changed.bg_ct, self.bg_ct, previous.bg_ct);
        diff_copy(&mut changed.bg_lmode, self.bg_lmode, previous.bg_lmode);
        diff_copy(&mut changed.bg_bright, self.bg_bright, previous.bg_bright);
        diff_copy(&mut changed.bg_rgb, self.bg_rgb, previous.bg_rgb);
        diff_copy(&mut changed.bg_hue, self.bg_hue, previous.bg_hue);
        diff_copy(&mut changed.bg_sat, self.bg_sat, previous.bg_sat);
        diff_copy(&mut changed.nl_br, self.nl_br, previous.nl_br);
        diff_copy(&mut changed.active_mode, self.active_mode, previous.active_mode);

        match self.bg_lmode {
            Some(ColorMode::Temperature) => {
                changed.bg_hue = None;
                changed.bg_sat = None;
            }
            Some(mode) if mode.is_color() => changed.bg_ct = None,
            _ => {}
        }
        changed
    }

    /// Returns `true` when no field is populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.model.is_none()
            && self.name.is_none()
            && self.power.is_none()
            && self.main_power.is_none()
            && self.bright.is_none()
            && self.ct.is_none()
            && self.rgb.is_none()
            && self.hue.is_none()
            && self.sat.is_none()
            && self.color_mode.is_none()
            && self.flowing.is_none()
            && self.delayoff.is_none()
            && self.flow_params.is_none()
            && self.music_on.is_none()
            && self.bg_power.is_none()
            && self.bg_flowing.is_none()
            && self.bg_flow_params.is_none()
            && self.bg_ct.is_none()
            && self.bg_lmode.is_none()
            && self.bg_bright.is_none()
            && self.bg_rgb.is_none()
            && self.bg_hue.is_none()
            && self.bg_sat.is_none()
            && self.nl_br.is_none()
            && self.active_mode.is_none()
    }
}

// ===== Coercion helpers =====

fn assign<T>(slot: &mut Option<T>, value: Option<T>) -> bool {
    match value {
        Some(v) => {
            *slot = Some(v);
            true
        }
        None => false,
    }
}

fn merge_copy<T: Copy>(slot: &mut Option<T>, other: Option<T>) {
    if other.is_some() {
        *slot = other;
    }
}

fn merge_clone<T: Clone>(slot: &mut Option<T>, other: &Option<T>) {
    if other.is_some() {
        slot.clone_from(other);
    }
}

fn diff_copy<T: Copy + PartialEq>(slot: &mut Option<T>, current: Option<T>, previous: Option<T>) {
    if current.is_some() && current != previous {
        *slot = current;
    }
}

fn diff_clone<T: Clone + PartialEq>(
    slot: &mut Option<T>,
    current: &Option<T>,
    previous: &Option<T>,
) {
    if current.is_some() && current != previous {
        slot.clone_from(current);
    }
}

fn text_of(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

/// Reads an integer from a JSON number or a decimal string. `get_prop`
/// replies encode every value as a string.
fn int_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn power_of(value: &Value) -> Option<Power> {
    value.as_str().and_then(|s| s.parse().ok())
}

fn brightness_of(raw: i64) -> Option<Brightness> {
    u8::try_from(raw).ok().and_then(|v| Brightness::new(v).ok())
}

fn color_temp_of(raw: i64) -> Option<ColorTemperature> {
    u16::try_from(raw).ok().and_then(|v| ColorTemperature::new(v).ok())
}

fn rgb_of(raw: i64) -> Option<Rgb> {
    u32::try_from(raw).ok().and_then(|v| Rgb::new(v).ok())
}

fn hue_of(raw: i64) -> Option<Hue> {
    u16::try_from(raw).ok().and_then(|v| Hue::new(v).ok())
}

fn saturation_of(raw: i64) -> Option<Saturation> {
    u8::try_from(raw).ok().and_then(|v| Saturation::new(v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn property_names_round_trip() {
        for name in PropertyName::ALL {
            assert_eq!(name.as_str().parse::<PropertyName>().unwrap(), name);
        }
    }

    #[test]
    fn unknown_property_name_is_rejected() {
        let err = "warp_drive".parse::<PropertyName>().unwrap_err();
        assert!(matches!(err, ValueError::UnknownProperty(ref name) if name == "warp_drive"));
    }

    #[test]
    fn set_raw_coerces_notification_values() {
        let mut record = DeviceProperty::default();
        assert!(record.set_raw(PropertyName::Power, &json!("on")));
        assert!(record.set_raw(PropertyName::Bright, &json!(80)));
        assert!(record.set_raw(PropertyName::BgRgb, &json!(0x00FF_00FF)));
        assert!(record.set_raw(PropertyName::BgLmode, &json!(2)));

        assert_eq!(record.power, Some(Power::On));
        assert_eq!(record.bright.map(|b| b.value()), Some(80));
        assert_eq!(record.bg_rgb.map(|rgb| rgb.packed()), Some(0x00FF_00FF));
        assert_eq!(record.bg_lmode, Some(ColorMode::Temperature));
    }

    #[test]
    fn set_raw_coerces_numeric_strings() {
        let mut record = DeviceProperty::default();
        assert!(record.set_raw(PropertyName::Bright, &json!("55")));
        assert!(record.set_raw(PropertyName::Ct, &json!("4000")));
        assert!(record.set_raw(PropertyName::BgHue, &json!("359")));

        assert_eq!(record.bright.map(|b| b.value()), Some(55));
        assert_eq!(record.ct.map(|ct| ct.kelvin()), Some(4000));
        assert_eq!(record.bg_hue.map(|h| h.value()), Some(359));
    }

    #[test]
    fn set_raw_accepts_numeric_flow_params() {
        let mut record = DeviceProperty::default();
        assert!(record.set_raw(PropertyName::FlowParams, &json!(0)));
        assert!(record.set_raw(PropertyName::BgFlowParams, &json!("42")));

        assert_eq!(record.flow_params, Some(0));
        assert_eq!(record.bg_flow_params, Some(42));
    }

    #[test]
    fn set_raw_skips_values_it_cannot_coerce() {
        let mut record = DeviceProperty::default();
        record.set_raw(PropertyName::Bright, &json!(70));

        assert!(!record.set_raw(PropertyName::Bright, &json!("loud")));
        assert!(!record.set_raw(PropertyName::Bright, &json!(400)));
        assert!(!record.set_raw(PropertyName::Power, &json!(1)));
        assert!(!record.set_raw(PropertyName::BgLmode, &json!(9)));

        assert_eq!(record.bright.map(|b| b.value()), Some(70));
        assert_eq!(record.power, None);
        assert_eq!(record.bg_lmode, None);
    }

    #[test]
    fn merge_overrides_only_populated_fields() {
        let mut base = DeviceProperty::default();
        base.set_raw(PropertyName::Power, &json!("on"));
        base.set_raw(PropertyName::Bright, &json!(40));

        let mut patch = DeviceProperty::default();
        patch.set_raw(PropertyName::Bright, &json!(90));
        patch.set_raw(PropertyName::BgPower, &json!("off"));

        base.merge_from(&patch);
        assert_eq!(base.power, Some(Power::On));
        assert_eq!(base.bright.map(|b| b.value()), Some(90));
        assert_eq!(base.bg_power, Some(Power::Off));
    }

    #[test]
    fn diff_reports_only_changed_fields() {
        let mut previous = DeviceProperty::default();
        previous.set_raw(PropertyName::Power, &json!("off"));
        previous.set_raw(PropertyName::Bright, &json!(40));

        let mut current = previous.clone();
        current.set_raw(PropertyName::Power, &json!("on"));
        current.set_raw(PropertyName::Ct, &json!(2700));

        let changed = current.diff(&previous);
        assert_eq!(changed.power, Some(Power::On));
        assert_eq!(changed.ct.map(|ct| ct.kelvin()), Some(2700));
        assert_eq!(changed.bright, None);
    }

    #[test]
    fn diff_of_identical_records_is_empty() {
        let mut record = DeviceProperty::default();
        record.set_raw(PropertyName::Power, &json!("on"));
        record.set_raw(PropertyName::BgRgb, &json!(0x0012_3456));

        assert!(record.diff(&record.clone()).is_empty());
    }

    #[test]
    fn temperature_mode_suppresses_background_hue_and_saturation() {
        let previous = DeviceProperty::default();
        let mut current = DeviceProperty::default();
        current.set_raw(PropertyName::BgLmode, &json!(2));
        current.set_raw(PropertyName::BgCt, &json!(5000));
        current.set_raw(PropertyName::BgHue, &json!(120));
        current.set_raw(PropertyName::BgSat, &json!(45));

        let changed = current.diff(&previous);
        assert_eq!(changed.bg_ct.map(|ct| ct.kelvin()), Some(5000));
        assert_eq!(changed.bg_lmode, Some(ColorMode::Temperature));
        assert_eq!(changed.bg_hue, None);
        assert_eq!(changed.bg_sat, None);
    }

    #[test]
    fn color_modes_suppress_background_temperature() {
        for raw_mode in [1, 3] {
            let previous = DeviceProperty::default();
            let mut current = DeviceProperty::default();
            current.set_raw(PropertyName::BgLmode, &json!(raw_mode));
            current.set_raw(PropertyName::BgCt, &json!(3500));
            current.set_raw(PropertyName::BgHue, &json!(200));

            let changed = current.diff(&previous);
            assert_eq!(changed.bg_ct, None);
            assert_eq!(changed.bg_hue.map(|h| h.value()), Some(200));
        }
    }

    #[test]
    fn unknown_background_mode_suppresses_nothing() {
        let previous = DeviceProperty::default();
        let mut current = DeviceProperty::default();
        current.set_raw(PropertyName::BgCt, &json!(3000));
        current.set_raw(PropertyName::BgHue, &json!(10));

        let changed = current.diff(&previous);
        assert_eq!(changed.bg_ct.map(|ct| ct.kelvin()), Some(3000));
        assert_eq!(changed.bg_hue.map(|h| h.value()), Some(10));
    }

    #[test]
    fn empty_record_reports_empty() {
        assert!(DeviceProperty::default().is_empty());

        let mut record = DeviceProperty::default();
        record.set_raw(PropertyName::NlBr, &json!(1));
        assert!(!record.is_empty());
    }
}
