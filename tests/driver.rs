mod common;

mod tests {
    use super::common::{Harness, MockPwm, PwmEvent};
    use wamb_light_core::config::DEFAULT_CHANNELS;
    use wamb_light_core::{
        ChannelConfig, ChannelRole, EffectId, EngineConfig, HardwareError, LightDriver,
        LightError, PwmTimerConfig, SharedLightState,
    };

    fn leak_driver() -> &'static LightDriver {
        Box::leak(Box::new(LightDriver::new()))
    }

    fn leak_light() -> &'static SharedLightState {
        Box::leak(Box::new(SharedLightState::default()))
    }

    #[test]
    fn test_requests_before_initialize_are_rejected() {
        let driver = leak_driver();
        assert_eq!(driver.is_initialized(), false);
        assert_eq!(driver.apply_state_update(), Err(LightError::NotInitialized));
        assert_eq!(
            driver.trigger_effect(EffectId::Blink),
            Err(LightError::NotInitialized)
        );
        assert_eq!(
            driver.trigger_raw_effect(0x01),
            Err(LightError::NotInitialized)
        );
    }

    #[test]
    fn test_initialize_configures_timer_then_channels() {
        let driver = leak_driver();
        let pwm = MockPwm::new();
        let events = pwm.events();

        let engine = driver
            .initialize(pwm, leak_light(), &EngineConfig::default())
            .unwrap();
        assert!(engine.is_some());
        assert_eq!(driver.is_initialized(), true);

        let mut expected = vec![PwmEvent::Timer(PwmTimerConfig::default())];
        expected.extend(DEFAULT_CHANNELS.iter().map(|c| PwmEvent::Channel(c.channel)));
        assert_eq!(*events.borrow(), expected);

        let engine = engine.unwrap();
        assert!(engine.fades().pwm().notifier.is_some());
        assert_eq!(engine.fades().channels(), &DEFAULT_CHANNELS);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let driver = leak_driver();
        let first = driver
            .initialize(MockPwm::new(), leak_light(), &EngineConfig::default())
            .unwrap();
        assert!(first.is_some());

        let pwm = MockPwm::new();
        let events = pwm.events();
        let second = driver
            .initialize(pwm, leak_light(), &EngineConfig::default())
            .unwrap();
        assert!(second.is_none());
        assert!(events.borrow().is_empty());
        assert_eq!(driver.is_initialized(), true);
    }

    #[test]
    fn test_hardware_failure_aborts_initialize() {
        let driver = leak_driver();
        let pwm = MockPwm {
            fail_timer: true,
            ..MockPwm::new()
        };

        let result = driver.initialize(pwm, leak_light(), &EngineConfig::default());
        assert!(matches!(result, Err(HardwareError::Timer)));
        assert_eq!(driver.is_initialized(), false);
        assert_eq!(driver.apply_state_update(), Err(LightError::NotInitialized));

        // A later attempt may succeed
        let engine = driver
            .initialize(MockPwm::new(), leak_light(), &EngineConfig::default())
            .unwrap();
        assert!(engine.is_some());
        assert_eq!(driver.apply_state_update(), Ok(()));
    }

    #[test]
    fn test_channel_failure_aborts_initialize() {
        let driver = leak_driver();
        let pwm = MockPwm {
            fail_channel: Some(2),
            ..MockPwm::new()
        };

        let result = driver.initialize(pwm, leak_light(), &EngineConfig::default());
        assert!(matches!(result, Err(HardwareError::Channel(2))));
        assert_eq!(driver.is_initialized(), false);
    }

    #[test]
    fn test_invalid_channel_layout_is_rejected() {
        let channels = [ChannelConfig::new(9, 18, ChannelRole::Unused)];
        let config = EngineConfig {
            channels: &channels,
            ..EngineConfig::default()
        };
        let result = leak_driver().initialize(MockPwm::new(), leak_light(), &config);
        assert!(matches!(result, Err(HardwareError::InvalidChannel(9))));

        let channels = [ChannelConfig::new(0, 18, ChannelRole::Unused); 9];
        let config = EngineConfig {
            channels: &channels,
            ..EngineConfig::default()
        };
        let result = leak_driver().initialize(MockPwm::new(), leak_light(), &config);
        assert!(matches!(result, Err(HardwareError::TooManyChannels)));
    }

    #[test]
    fn test_unknown_effect_id_is_rejected() {
        let mut harness = Harness::new();

        assert_eq!(
            harness.driver.trigger_raw_effect(0x03),
            Err(LightError::UnknownEffect(0x03))
        );
        harness.step();
        assert_eq!(harness.engine.active_effect(), None);
        assert_eq!(harness.fade_count(), 0);
    }

    #[test]
    fn test_raw_effect_ids() {
        let mut harness = Harness::new();

        harness.driver.trigger_raw_effect(0x0b).unwrap();
        harness.step();
        assert_eq!(
            harness.engine.active_effect(),
            Some(EffectId::ChannelChange)
        );

        harness.driver.trigger_raw_effect(0xff).unwrap();
        harness.step();
        assert_eq!(harness.engine.active_effect(), None);
    }

    #[test]
    fn test_empty_channel_layout_is_rejected() {
        let driver = leak_driver();
        let config = EngineConfig {
            channels: &[],
            ..EngineConfig::default()
        };

        let result = driver.initialize(MockPwm::new(), leak_light(), &config);
        assert!(matches!(result, Err(HardwareError::NoChannels)));
        assert_eq!(driver.is_initialized(), false);
        assert_eq!(
            driver.trigger_effect(EffectId::Blink),
            Err(LightError::NotInitialized)
        );
    }

    #[test]
    fn test_unsupported_duty_resolution_is_rejected() {
        let config = EngineConfig {
            timer: PwmTimerConfig {
                duty_resolution_bits: 32,
                ..PwmTimerConfig::default()
            },
            ..EngineConfig::default()
        };

        let driver = leak_driver();
        let result = driver.initialize(MockPwm::new(), leak_light(), &config);
        assert!(matches!(
            result,
            Err(HardwareError::InvalidDutyResolution(32))
        ));
        assert_eq!(driver.is_initialized(), false);
    }
}
