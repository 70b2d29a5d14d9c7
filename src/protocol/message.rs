// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire message types for the LAN control protocol.
//!
//! Outbound traffic is a [`CommandMessage`] serialized to one JSON line.
//! Inbound traffic is either a [`CommandResponse`] (carries the id of the
//! command it answers) or a [`NotificationMessage`] (unsolicited state
//! push). Classification of inbound JSON lives in [`super::codec`].

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{ParseError, Result, ValueError};
use crate::state::{DeviceProperty, PropertyName};
use crate::types::{Brightness, ColorTemperature, Hue, LightType, Power, Saturation, Transition};

/// The closed set of command methods the device accepts.
///
/// Wire names are the snake_case form of the variant name. Methods with a
/// `Bg` prefix address the background light; the rest address the main
/// light or, for [`DevToggle`](Self::DevToggle), both channels at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandMethod {
    GetProp,
    SetCtAbx,
    SetRgb,
    SetHsv,
    SetBright,
    SetPower,
    Toggle,
    /// Persists the current state as the power-on default.
    SetDefault,
    /// Starts a color flow from an expression string.
    StartCf,
    StopCf,
    SetScene,
    /// Arms the sleep timer (minutes until auto power-off).
    CronAdd,
    CronGet,
    CronDel,
    /// Relative adjustment by action/property token pair.
    SetAdjust,
    SetMusic,
    SetName,
    BgSetRgb,
    BgSetHsv,
    BgSetCtAbx,
    BgStartCf,
    BgStopCf,
    BgSetScene,
    BgSetDefault,
    BgSetPower,
    BgSetBright,
    BgSetAdjust,
    BgToggle,
    /// Toggles main and background light together.
    DevToggle,
    AdjustBright,
    AdjustCt,
    AdjustColor,
    BgAdjustBright,
    BgAdjustCt,
}

impl CommandMethod {
    /// Number of methods in the set. Sizes per-method tables such as the
    /// debounce pool.
    pub const COUNT: usize = 34;

    /// Every method, in wire catalogue order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::GetProp,
        Self::SetCtAbx,
        Self::SetRgb,
        Self::SetHsv,
        Self::SetBright,
        Self::SetPower,
        Self::Toggle,
        Self::SetDefault,
        Self::StartCf,
        Self::StopCf,
        Self::SetScene,
        Self::CronAdd,
        Self::CronGet,
        Self::CronDel,
        Self::SetAdjust,
        Self::SetMusic,
        Self::SetName,
        Self::BgSetRgb,
        Self::BgSetHsv,
        Self::BgSetCtAbx,
        Self::BgStartCf,
        Self::BgStopCf,
        Self::BgSetScene,
        Self::BgSetDefault,
        Self::BgSetPower,
        Self::BgSetBright,
        Self::BgSetAdjust,
        Self::BgToggle,
        Self::DevToggle,
        Self::AdjustBright,
        Self::AdjustCt,
        Self::AdjustColor,
        Self::BgAdjustBright,
        Self::BgAdjustCt,
    ];

    /// Returns the wire name of this method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GetProp => "get_prop",
            Self::SetCtAbx => "set_ct_abx",
            Self::SetRgb => "set_rgb",
            Self::SetHsv => "set_hsv",
            Self::SetBright => "set_bright",
            Self::SetPower => "set_power",
            Self::Toggle => "toggle",
            Self::SetDefault => "set_default",
            Self::StartCf => "start_cf",
            Self::StopCf => "stop_cf",
            Self::SetScene => "set_scene",
            Self::CronAdd => "cron_add",
            Self::CronGet => "cron_get",
            Self::CronDel => "cron_del",
            Self::SetAdjust => "set_adjust",
            Self::SetMusic => "set_music",
            Self::SetName => "set_name",
            Self::BgSetRgb => "bg_set_rgb",
            Self::BgSetHsv => "bg_set_hsv",
            Self::BgSetCtAbx => "bg_set_ct_abx",
            Self::BgStartCf => "bg_start_cf",
            Self::BgStopCf => "bg_stop_cf",
            Self::BgSetScene => "bg_set_scene",
            Self::BgSetDefault => "bg_set_default",
            Self::BgSetPower => "bg_set_power",
            Self::BgSetBright => "bg_set_bright",
            Self::BgSetAdjust => "bg_set_adjust",
            Self::BgToggle => "bg_toggle",
            Self::DevToggle => "dev_toggle",
            Self::AdjustBright => "adjust_bright",
            Self::AdjustCt => "adjust_ct",
            Self::AdjustColor => "adjust_color",
            Self::BgAdjustBright => "bg_adjust_bright",
            Self::BgAdjustCt => "bg_adjust_ct",
        }
    }

    /// Returns a stable index in `0..COUNT` for per-method tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CommandMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandMethod {
    type Err = ValueError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "get_prop" => Ok(Self::GetProp),
            "set_ct_abx" => Ok(Self::SetCtAbx),
            "set_rgb" => Ok(Self::SetRgb),
            "set_hsv" => Ok(Self::SetHsv),
            "set_bright" => Ok(Self::SetBright),
            "set_power" => Ok(Self::SetPower),
            "toggle" => Ok(Self::Toggle),
            "set_default" => Ok(Self::SetDefault),
            "start_cf" => Ok(Self::StartCf),
            "stop_cf" => Ok(Self::StopCf),
            "set_scene" => Ok(Self::SetScene),
            "cron_add" => Ok(Self::CronAdd),
            "cron_get" => Ok(Self::CronGet),
            "cron_del" => Ok(Self::CronDel),
            "set_adjust" => Ok(Self::SetAdjust),
            "set_music" => Ok(Self::SetMusic),
            "set_name" => Ok(Self::SetName),
            "bg_set_rgb" => Ok(Self::BgSetRgb),
            "bg_set_hsv" => Ok(Self::BgSetHsv),
            "bg_set_ct_abx" => Ok(Self::BgSetCtAbx),
            "bg_start_cf" => Ok(Self::BgStartCf),
            "bg_stop_cf" => Ok(Self::BgStopCf),
            "bg_set_scene" => Ok(Self::BgSetScene),
            "bg_set_default" => Ok(Self::BgSetDefault),
            "bg_set_power" => Ok(Self::BgSetPower),
            "bg_set_bright" => Ok(Self::BgSetBright),
            "bg_set_adjust" => Ok(Self::BgSetAdjust),
            "bg_toggle" => Ok(Self::BgToggle),
            "dev_toggle" => Ok(Self::DevToggle),
            "adjust_bright" => Ok(Self::AdjustBright),
            "adjust_ct" => Ok(Self::AdjustCt),
            "adjust_color" => Ok(Self::AdjustColor),
            "bg_adjust_bright" => Ok(Self::BgAdjustBright),
            "bg_adjust_ct" => Ok(Self::BgAdjustCt),
            other => Err(ValueError::UnknownMethod(other.to_string())),
        }
    }
}

/// One positional command parameter.
///
/// The protocol mixes strings and integers inside a single `params` list,
/// e.g. `["on", "smooth", 500]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Param {
    Int(i64),
    Text(String),
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for Param {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u16> for Param {
    fn from(value: u16) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u8> for Param {
    fn from(value: u8) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// An outbound command.
///
/// Freshly built commands carry [`UNTRACKED_ID`](Self::UNTRACKED_ID); the
/// dispatcher assigns the real correlation id right before sending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandMessage {
    pub id: i64,
    pub method: CommandMethod,
    pub params: Vec<Param>,
}

impl CommandMessage {
    /// Placeholder id of a command not yet handed to the dispatcher.
    pub const UNTRACKED_ID: i64 = -1;

    /// Builds a command with an untracked id.
    #[must_use]
    pub fn new(method: CommandMethod, params: Vec<Param>) -> Self {
        Self {
            id: Self::UNTRACKED_ID,
            method,
            params,
        }
    }

    /// Builds a `get_prop` query for the given property names.
    #[must_use]
    pub fn get_prop(names: &[PropertyName]) -> Self {
        let params = names.iter().map(|name| Param::from(name.as_str())).collect();
        Self::new(CommandMethod::GetProp, params)
    }

    /// Builds a power command for the given channel.
    #[must_use]
    pub fn set_power(light: LightType, power: Power, transition: Transition) -> Self {
        let method = match light {
            LightType::Main => CommandMethod::SetPower,
            LightType::Background => CommandMethod::BgSetPower,
        };
        let mut params = vec![Param::from(power.as_str())];
        push_transition(&mut params, transition);
        Self::new(method, params)
    }

    /// Builds a brightness command for the given channel.
    #[must_use]
    pub fn set_brightness(light: LightType, level: Brightness, transition: Transition) -> Self {
        let method = match light {
            LightType::Main => CommandMethod::SetBright,
            LightType::Background => CommandMethod::BgSetBright,
        };
        let mut params = vec![Param::from(level.value())];
        push_transition(&mut params, transition);
        Self::new(method, params)
    }

    /// Builds a color-temperature command for the given channel.
    #[must_use]
    pub fn set_color_temperature(
        light: LightType,
        temperature: ColorTemperature,
        transition: Transition,
    ) -> Self {
        let method = match light {
            LightType::Main => CommandMethod::SetCtAbx,
            LightType::Background => CommandMethod::BgSetCtAbx,
        };
        let mut params = vec![Param::from(temperature.kelvin())];
        push_transition(&mut params, transition);
        Self::new(method, params)
    }

    /// Builds an HSV command for the given channel. The device takes hue
    /// and saturation jointly in one command.
    #[must_use]
    pub fn set_hsv(
        light: LightType,
        hue: Hue,
        saturation: Saturation,
        transition: Transition,
    ) -> Self {
        let method = match light {
            LightType::Main => CommandMethod::SetHsv,
            LightType::Background => CommandMethod::BgSetHsv,
        };
        let mut params = vec![Param::from(hue.value()), Param::from(saturation.value())];
        push_transition(&mut params, transition);
        Self::new(method, params)
    }

    /// Serializes the command to a single JSON line, without terminator.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Json`] if serialization fails.
    pub fn to_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self).map_err(ParseError::from)?)
    }
}

fn push_transition(params: &mut Vec<Param>, transition: Transition) {
    params.push(Param::from(transition.token()));
    params.push(Param::from(transition.duration_ms()));
}

/// A recognized inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    Response(CommandResponse),
    Notification(NotificationMessage),
}

/// The device's answer to one command, matched by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    pub id: i64,
    pub outcome: ResponseOutcome,
}

/// Success or device-reported failure of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// Positional result strings; `["ok"]` for most setters.
    Result(Vec<String>),
    /// The device rejected the command.
    Error { code: i64, message: String },
}

/// An unsolicited `props` state push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    /// The fields the push carried, already coerced. Unknown keys and
    /// uncoercible values are absent.
    pub record: DeviceProperty,
    /// Whether the raw params named any power-family key, coercible or
    /// not. Power transitions make pushed values untrustworthy, so the
    /// session re-reads state instead of merging when this is set.
    pub touches_power: bool,
}
