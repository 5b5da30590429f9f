//! Hub capability writes → Tuya command batches.

use crate::capability::{
    CapabilitySet, CapabilityState, CapabilityValue, CapabilityWrite, HubCapability, LightMode,
};
use crate::error::ValidationError;
use crate::tuya::{ColourData, CommandBatch, TuyaValue, codes, work_mode};

use super::FanProfile;

/// Partial write to the light capability group.
///
/// Unset fields fall back to the current hub state when composing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LightWrite {
    pub dim: Option<f64>,
    pub mode: Option<LightMode>,
    /// An explicit `null` light mode, to be inferred again.
    pub clear_mode: bool,
    pub hue: Option<f64>,
    pub saturation: Option<f64>,
    pub temperature: Option<f64>,
}

impl LightWrite {
    /// Record one field of the group.
    ///
    /// A `null` light mode clears the mode so it is inferred again.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidValue`] when the value has the wrong
    /// type, and [`ValidationError::NotWritable`] for capabilities outside the
    /// light group.
    pub fn set(
        &mut self,
        capability: HubCapability,
        value: &CapabilityValue,
    ) -> Result<(), ValidationError> {
        if capability == HubCapability::LightMode {
            (self.mode, self.clear_mode) = match value {
                CapabilityValue::Null => (None, true),
                CapabilityValue::Text(text) => (Some(text.parse()?), false),
                _ => {
                    return Err(ValidationError::InvalidValue {
                        capability,
                        expected: "light mode",
                    });
                }
            };
            return Ok(());
        }

        let slot = match capability {
            HubCapability::DimLight => &mut self.dim,
            HubCapability::LightHue => &mut self.hue,
            HubCapability::LightSaturation => &mut self.saturation,
            HubCapability::LightTemperature => &mut self.temperature,
            other => return Err(ValidationError::NotWritable(other)),
        };
        *slot = Some(value.as_f64().ok_or(ValidationError::InvalidValue {
            capability,
            expected: "number",
        })?);
        Ok(())
    }

    /// Overlay the fields set in `later` onto `self`. A later `null` mode
    /// drops an earlier explicit one.
    pub fn merge(&mut self, later: Self) {
        self.dim = later.dim.or(self.dim);
        if later.clear_mode {
            self.mode = None;
            self.clear_mode = true;
        } else if later.mode.is_some() {
            self.mode = later.mode;
            self.clear_mode = false;
        }
        self.hue = later.hue.or(self.hue);
        self.saturation = later.saturation.or(self.saturation);
        self.temperature = later.temperature.or(self.temperature);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The explicitly set fields as capability writes.
    #[must_use]
    pub fn fields(&self) -> Vec<CapabilityWrite> {
        let numbers = [
            (HubCapability::DimLight, self.dim),
            (HubCapability::LightHue, self.hue),
            (HubCapability::LightSaturation, self.saturation),
            (HubCapability::LightTemperature, self.temperature),
        ];
        let mut fields: Vec<CapabilityWrite> = numbers
            .into_iter()
            .filter_map(|(capability, value)| value.map(|v| CapabilityWrite::new(capability, v)))
            .collect();
        if let Some(mode) = self.mode {
            fields.push(CapabilityWrite::new(HubCapability::LightMode, mode));
        } else if self.clear_mode {
            fields.push(CapabilityWrite::new(
                HubCapability::LightMode,
                CapabilityValue::Null,
            ));
        }
        fields
    }
}

/// Light mode a write applies to.
///
/// Explicit value first, then the current hub state unless the write
/// cleared it, then colour when the device has a hue capability, else
/// temperature.
#[must_use]
pub fn effective_mode(
    active: &CapabilitySet,
    state: &CapabilityState,
    write: &LightWrite,
) -> LightMode {
    let current = if write.clear_mode {
        None
    } else {
        state.light_mode()
    };
    write.mode.or(current).unwrap_or(
        if active.contains(HubCapability::LightHue) {
            LightMode::Color
        } else {
            LightMode::Temperature
        },
    )
}

/// Compose the command batch for a coalesced light-group write.
///
/// Returns an empty batch when nothing needs to be sent.
#[must_use]
pub fn compose_light_commands(
    profile: &FanProfile,
    active: &CapabilitySet,
    state: &CapabilityState,
    write: &LightWrite,
) -> CommandBatch {
    let mut batch = CommandBatch::new();
    let calibration = &profile.calibration;

    let mode = effective_mode(active, state, write);
    let dim = write.dim.or_else(|| state.number(HubCapability::DimLight));

    if profile.has_tuya(codes::WORK_MODE) {
        let value = match mode {
            LightMode::Color => work_mode::COLOUR,
            LightMode::Temperature => work_mode::WHITE,
        };
        batch.push(codes::WORK_MODE, value);
    }

    match mode {
        LightMode::Color => {
            let hue = write
                .hue
                .or_else(|| state.number(HubCapability::LightHue))
                .unwrap_or_default();
            let saturation = write
                .saturation
                .or_else(|| state.number(HubCapability::LightSaturation))
                .unwrap_or_default();
            let specs = calibration.colour;
            let colour = ColourData {
                h: specs.h.denormalize(hue),
                s: specs.s.denormalize(saturation),
                v: specs.v.denormalize(dim.unwrap_or_default()),
            };
            batch.push(codes::COLOUR_DATA, colour);
        }
        LightMode::Temperature => {
            let temperature = write
                .temperature
                .or_else(|| state.number(HubCapability::LightTemperature));

            if let Some(dim) = dim.filter(|d| is_truthy(*d))
                && profile.has_tuya(codes::BRIGHT_VALUE)
            {
                batch.push(codes::BRIGHT_VALUE, calibration.brightness.denormalize(dim));
            }

            // Denormalized with the brightness range, as the device firmware
            // has always received it.
            if let Some(temperature) = temperature.filter(|t| is_truthy(*t))
                && profile.has_tuya(codes::TEMP_VALUE)
            {
                batch.push(
                    codes::TEMP_VALUE,
                    calibration.brightness.denormalize(temperature),
                );
            }
        }
    }

    batch
}

/// Compose the single command for a plain read-write capability write.
///
/// # Errors
///
/// Returns [`ValidationError::NotWritable`] when no Tuya code is routed for
/// the capability, and [`ValidationError::InvalidValue`] for a `null` value.
pub fn compose_command(
    profile: &FanProfile,
    capability: HubCapability,
    value: &CapabilityValue,
) -> Result<CommandBatch, ValidationError> {
    let code = profile
        .map()
        .command_code(capability)
        .ok_or(ValidationError::NotWritable(capability))?;
    let value = match value {
        CapabilityValue::Bool(b) => TuyaValue::Bool(*b),
        CapabilityValue::Number(n) => TuyaValue::Number(profile.speed_to_tuya(capability, *n)),
        CapabilityValue::Text(text) => TuyaValue::Text(text.clone()),
        CapabilityValue::Null => {
            return Err(ValidationError::InvalidValue {
                capability,
                expected: "non-null",
            });
        }
    };
    let mut batch = CommandBatch::new();
    batch.push(code, value);
    Ok(batch)
}

fn is_truthy(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::CalibrationSpec;
    use crate::fan::fixtures::{active, profile};

    const ALL_LIGHT_CODES: [&str; 5] = [
        codes::WORK_MODE,
        codes::BRIGHT_VALUE,
        codes::TEMP_VALUE,
        codes::COLOUR_DATA,
        codes::COLOUR,
    ];

    fn colour_of(batch: &CommandBatch) -> ColourData {
        batch
            .get(codes::COLOUR_DATA)
            .and_then(TuyaValue::as_colour)
            .unwrap()
    }

    fn number_of(batch: &CommandBatch, code: &str) -> f64 {
        batch.get(code).and_then(TuyaValue::as_number).unwrap()
    }

    #[test]
    fn should_infer_colour_mode_and_emit_single_colour_command() {
        let profile = profile("fs", &[codes::BRIGHT_VALUE, codes::TEMP_VALUE, codes::COLOUR_DATA]);
        let caps = active(&[
            HubCapability::LightHue,
            HubCapability::LightSaturation,
            HubCapability::DimLight,
            HubCapability::LightTemperature,
        ]);
        let write = LightWrite {
            dim: Some(0.5),
            hue: Some(0.5),
            saturation: Some(1.0),
            temperature: Some(0.3),
            ..LightWrite::default()
        };

        let batch = compose_light_commands(&profile, &caps, &CapabilityState::default(), &write);

        assert_eq!(batch.len(), 1);
        let colour = colour_of(&batch);
        assert!((colour.h - 180.0).abs() < 1e-9);
        assert!((colour.s - 1000.0).abs() < 1e-9);
        assert!((colour.v - 50.0).abs() < 1e-9);
        assert!(batch.get(codes::BRIGHT_VALUE).is_none());
        assert!(batch.get(codes::TEMP_VALUE).is_none());
    }

    #[test]
    fn should_infer_temperature_mode_without_hue_capability() {
        let caps = active(&[HubCapability::DimLight, HubCapability::LightTemperature]);
        assert_eq!(
            effective_mode(&caps, &CapabilityState::default(), &LightWrite::default()),
            LightMode::Temperature
        );
    }

    #[test]
    fn should_prefer_current_mode_over_inference() {
        let caps = active(&[HubCapability::LightHue]);
        let mut state = CapabilityState::default();
        state.set(HubCapability::LightMode, LightMode::Temperature.into());
        assert_eq!(
            effective_mode(&caps, &state, &LightWrite::default()),
            LightMode::Temperature
        );

        let write = LightWrite {
            mode: Some(LightMode::Color),
            ..LightWrite::default()
        };
        assert_eq!(effective_mode(&caps, &state, &write), LightMode::Color);
    }

    #[test]
    fn should_infer_mode_again_when_write_clears_it() {
        let caps = active(&[HubCapability::LightHue]);
        let mut state = CapabilityState::default();
        state.set(HubCapability::LightMode, LightMode::Temperature.into());
        let write = LightWrite {
            clear_mode: true,
            ..LightWrite::default()
        };

        assert_eq!(effective_mode(&caps, &state, &write), LightMode::Color);
    }

    #[test]
    fn should_always_emit_work_mode_when_device_has_it() {
        let profile = profile("fs", &ALL_LIGHT_CODES);
        let caps = active(&[HubCapability::DimLight, HubCapability::LightTemperature]);
        let write = LightWrite {
            mode: Some(LightMode::Temperature),
            ..LightWrite::default()
        };

        let batch = compose_light_commands(&profile, &caps, &CapabilityState::default(), &write);

        assert_eq!(batch.get(codes::WORK_MODE), Some(&TuyaValue::from("white")));
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn should_emit_colour_work_mode_alongside_colour_data() {
        let profile = profile("fs", &ALL_LIGHT_CODES);
        let write = LightWrite {
            mode: Some(LightMode::Color),
            hue: Some(0.0),
            saturation: Some(0.0),
            dim: Some(1.0),
            ..LightWrite::default()
        };

        let batch = compose_light_commands(
            &profile,
            &active(&[HubCapability::LightHue]),
            &CapabilityState::default(),
            &write,
        );

        let order: Vec<&str> = batch.codes().collect();
        assert_eq!(order, [codes::WORK_MODE, codes::COLOUR_DATA]);
        assert_eq!(batch.get(codes::WORK_MODE), Some(&TuyaValue::from("colour")));
        assert!((colour_of(&batch).v - 100.0).abs() < 1e-9);
    }

    #[test]
    fn should_not_emit_brightness_when_dim_is_zero() {
        let profile = profile("fs", &[codes::BRIGHT_VALUE, codes::TEMP_VALUE]);
        let write = LightWrite {
            mode: Some(LightMode::Temperature),
            dim: Some(0.0),
            ..LightWrite::default()
        };

        let batch = compose_light_commands(
            &profile,
            &active(&[HubCapability::DimLight]),
            &CapabilityState::default(),
            &write,
        );

        assert!(batch.is_empty());
    }

    #[test]
    fn should_emit_brightness_and_temperature_in_temperature_mode() {
        let profile = profile("fs", &[codes::BRIGHT_VALUE, codes::TEMP_VALUE]);
        let write = LightWrite {
            mode: Some(LightMode::Temperature),
            dim: Some(0.5),
            temperature: Some(0.25),
            ..LightWrite::default()
        };

        let batch = compose_light_commands(
            &profile,
            &active(&[HubCapability::DimLight, HubCapability::LightTemperature]),
            &CapabilityState::default(),
            &write,
        );

        assert!((number_of(&batch, codes::BRIGHT_VALUE) - 510.0).abs() < 1e-9);
        // Brightness range (10..1010), not the 0..500 temperature range.
        assert!((number_of(&batch, codes::TEMP_VALUE) - 260.0).abs() < 1e-9);
    }

    #[test]
    fn should_skip_codes_the_device_does_not_expose() {
        let profile = profile("fs", &[codes::TEMP_VALUE]);
        let write = LightWrite {
            mode: Some(LightMode::Temperature),
            dim: Some(0.5),
            temperature: Some(0.5),
            ..LightWrite::default()
        };

        let batch = compose_light_commands(
            &profile,
            &active(&[HubCapability::LightTemperature]),
            &CapabilityState::default(),
            &write,
        );

        let order: Vec<&str> = batch.codes().collect();
        assert_eq!(order, [codes::TEMP_VALUE]);
    }

    #[test]
    fn should_default_unset_fields_from_current_state() {
        let profile = profile("fs", &[codes::BRIGHT_VALUE, codes::TEMP_VALUE]);
        let mut state = CapabilityState::default();
        state.set(HubCapability::LightTemperature, 0.5.into());
        state.set(HubCapability::DimLight, 1.0.into());
        let write = LightWrite {
            dim: Some(0.5),
            ..LightWrite::default()
        };

        let batch = compose_light_commands(
            &profile,
            &active(&[HubCapability::DimLight, HubCapability::LightTemperature]),
            &state,
            &write,
        );

        assert!((number_of(&batch, codes::BRIGHT_VALUE) - 510.0).abs() < 1e-9);
        assert!((number_of(&batch, codes::TEMP_VALUE) - 510.0).abs() < 1e-9);
    }

    #[test]
    fn should_merge_later_fields_over_earlier_ones() {
        let mut pending = LightWrite {
            hue: Some(0.1),
            dim: Some(0.2),
            ..LightWrite::default()
        };
        pending.merge(LightWrite {
            hue: Some(0.9),
            saturation: Some(0.3),
            ..LightWrite::default()
        });

        assert_eq!(pending.hue, Some(0.9));
        assert_eq!(pending.dim, Some(0.2));
        assert_eq!(pending.saturation, Some(0.3));
    }

    #[test]
    fn should_drop_pending_mode_on_later_null_mode() {
        let mut pending = LightWrite::default();
        pending
            .set(HubCapability::LightMode, &LightMode::Temperature.into())
            .unwrap();
        let mut later = LightWrite::default();
        later
            .set(HubCapability::LightMode, &CapabilityValue::Null)
            .unwrap();

        pending.merge(later);

        assert_eq!(pending.mode, None);
        assert!(pending.clear_mode);
        assert_eq!(
            pending.fields(),
            [CapabilityWrite::new(
                HubCapability::LightMode,
                CapabilityValue::Null
            )]
        );

        let mut again = LightWrite::default();
        again
            .set(HubCapability::LightMode, &LightMode::Color.into())
            .unwrap();
        pending.merge(again);
        assert_eq!(pending.mode, Some(LightMode::Color));
        assert!(!pending.clear_mode);
    }

    #[test]
    fn should_record_light_fields_from_capability_values() {
        let mut write = LightWrite::default();
        write.set(HubCapability::LightHue, &0.4.into()).unwrap();
        write
            .set(HubCapability::LightMode, &LightMode::Color.into())
            .unwrap();

        assert_eq!(write.hue, Some(0.4));
        assert_eq!(write.mode, Some(LightMode::Color));
        assert_eq!(write.fields().len(), 2);
    }

    #[test]
    fn should_reject_non_light_capability_in_light_write() {
        let mut write = LightWrite::default();
        assert_eq!(
            write.set(HubCapability::Onoff, &true.into()),
            Err(ValidationError::NotWritable(HubCapability::Onoff))
        );
    }

    #[test]
    fn should_reject_wrong_value_type_in_light_write() {
        let mut write = LightWrite::default();
        assert!(matches!(
            write.set(HubCapability::DimLight, &true.into()),
            Err(ValidationError::InvalidValue { .. })
        ));
        assert!(write.is_empty());
    }

    #[test]
    fn should_compose_single_command_for_read_write_capability() {
        let profile = profile("fs", &[codes::SWITCH]);
        let batch = compose_command(&profile, HubCapability::Onoff, &true.into()).unwrap();
        assert_eq!(batch.get(codes::SWITCH), Some(&TuyaValue::Bool(true)));
    }

    #[test]
    fn should_denormalize_dim_into_fan_speed_for_fsd() {
        let mut profile = profile("fsd", &[]);
        profile.calibration.speed = Some(CalibrationSpec::new(1.0, 6.0));
        let batch = compose_command(&profile, HubCapability::Dim, &0.4.into()).unwrap();
        assert!((number_of(&batch, codes::FAN_SPEED) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn should_refuse_command_without_routed_code() {
        let profile = profile("fs", &[]);
        assert_eq!(
            compose_command(&profile, HubCapability::Onoff, &true.into()),
            Err(ValidationError::NotWritable(HubCapability::Onoff))
        );
    }
}
