//! End-to-end session behaviour against a scripted transport

use std::thread;

use tfmini_driver::{
    BaudRate, Command, DetectionPattern, DeviceId, DistanceMode, DistanceUnit, MeasureError,
    OutputDataFormat, ProfileError, SensorProfile, SessionConfig, Setting, Status, Tfmini,
    TriggerSource,
};
use tfmini_hal::mock::MockTransport;

const ACK_OK: [u8; 4] = [0x42, 0x57, 0x02, 0x01];
const ACK_BAD_PARAM: [u8; 4] = [0x42, 0x57, 0x02, 0x0F];
const ENTER: [u8; 8] = [0x42, 0x57, 0x02, 0x00, 0x00, 0x00, 0x01, 0x02];
const EXIT: [u8; 8] = [0x42, 0x57, 0x02, 0x00, 0x00, 0x00, 0x00, 0x02];

fn acking() -> Tfmini<MockTransport> {
    Tfmini::new(DeviceId(1), MockTransport::replying(&ACK_OK))
}

fn sent(lidar: &Tfmini<MockTransport>) -> Vec<Vec<u8>> {
    lidar
        .transport()
        .sent_frames()
        .map(|frame| frame.to_vec())
        .collect()
}

/// Build a measurement frame with a correct checksum
fn measurement_frame(distance: u16, strength: u16, mode: u8) -> [u8; 9] {
    let [d_lo, d_hi] = distance.to_le_bytes();
    let [s_lo, s_hi] = strength.to_le_bytes();
    let mut frame = [0x59, 0x59, d_lo, d_hi, s_lo, s_hi, mode, 0x00, 0x00];
    frame[8] = frame[..8].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    frame
}

#[test]
fn every_setter_succeeds_with_acking_sensor() {
    let mut lidar = acking();

    assert_eq!(lidar.set_output_format(OutputDataFormat::Pixhawk), Status::Success);
    assert_eq!(lidar.set_output_period(20), Status::Success);
    assert_eq!(lidar.set_distance_unit(DistanceUnit::Millimeter), Status::Success);
    assert_eq!(lidar.set_detection_pattern(DetectionPattern::Auto), Status::Success);
    assert_eq!(lidar.set_distance_mode(DistanceMode::Long), Status::Success);
    assert_eq!(lidar.set_range_limit(1000), Status::Success);
    assert_eq!(lidar.set_signal_strength_low(40), Status::Success);
    assert_eq!(lidar.set_signal_strength_high(2000), Status::Success);
    assert_eq!(lidar.set_baud_rate(BaudRate::B460800), Status::Success);
    assert_eq!(lidar.set_trigger_source(TriggerSource::External), Status::Success);
    assert_eq!(lidar.trigger_measurement(), Status::Success);
    assert_eq!(lidar.reset(), Status::Success);
}

#[test]
fn setter_frames_carry_encoded_parameters() {
    let mut lidar = acking();

    lidar.set_range_limit(1000);
    lidar.set_output_period(250);
    lidar.set_signal_strength_high(0x0ABC);

    let frames = sent(&lidar);
    assert_eq!(frames.len(), 9);
    assert_eq!(frames[1], [0x42, 0x57, 0x02, 0x00, 0xE8, 0x03, 0x01, 0x19]);
    assert_eq!(frames[4], [0x42, 0x57, 0x02, 0x00, 0xFA, 0x00, 0x00, 0x07]);
    assert_eq!(frames[7], [0x42, 0x57, 0x02, 0x00, 0xBC, 0x0A, 0x00, 0x21]);
}

#[test]
fn disabling_range_limit_clears_flag() {
    let mut lidar = acking();
    assert_eq!(lidar.set_range_limit(0), Status::Success);

    let frames = sent(&lidar);
    assert_eq!(frames[1], [0x42, 0x57, 0x02, 0x00, 0x00, 0x00, 0x00, 0x19]);
}

#[test]
fn out_of_range_limit_is_rejected_without_io() {
    let mut lidar = acking();

    assert_eq!(lidar.set_range_limit(200), Status::ErrorParameter);
    assert_eq!(lidar.transport().send_calls(), 0);
    assert_eq!(lidar.transport().receive_calls(), 0);
}

#[test]
fn odd_output_period_is_rejected_without_io() {
    let mut lidar = acking();

    assert_eq!(lidar.set_output_period(15), Status::ErrorParameter);
    assert_eq!(lidar.transport().send_calls(), 0);
}

#[test]
fn silent_sensor_gives_transmission_error() {
    let mut mock = MockTransport::new();
    mock.set_idle_byte(Some(0x57));
    let mut lidar = Tfmini::new(DeviceId(1), mock);

    assert_eq!(lidar.set_distance_unit(DistanceUnit::Centimeter), Status::ErrorTransmission);
    assert_eq!(lidar.reset(), Status::ErrorTransmission);

    // Three enter attempts per command, nothing else
    let frames = sent(&lidar);
    assert_eq!(frames.len(), 6);
    assert!(frames.iter().all(|f| f[..] == ENTER));
}

#[test]
fn enter_attempts_follow_config() {
    let mut mock = MockTransport::new();
    mock.set_idle_byte(Some(0x00));
    let config = SessionConfig {
        max_search_attempts: 8,
        enter_attempts: 5,
    };
    let mut lidar = Tfmini::with_config(DeviceId(1), mock, config);

    assert_eq!(lidar.trigger_measurement(), Status::ErrorTransmission);
    assert_eq!(lidar.transport().send_calls(), 5);
    assert_eq!(lidar.transport().receive_calls(), 5 * 8);
}

#[test]
fn enter_succeeds_on_retry() {
    let mut mock = MockTransport::new();
    // First enter sees only noise; the second is acknowledged
    mock.push_rx(&[0x00; 50]).unwrap();
    mock.push_rx(&ACK_OK).unwrap();
    mock.push_rx(&ACK_OK).unwrap();
    mock.push_rx(&ACK_OK).unwrap();
    let mut lidar = Tfmini::new(DeviceId(1), mock);

    assert_eq!(lidar.set_detection_pattern(DetectionPattern::Fix), Status::Success);
    let frames = sent(&lidar);
    assert_eq!(frames.len(), 4);
    assert_eq!(frames[0], ENTER);
    assert_eq!(frames[1], ENTER);
    assert_eq!(frames[3], EXIT);
}

#[test]
fn command_status_is_reported_after_exit() {
    let mut mock = MockTransport::new();
    mock.push_rx(&ACK_OK).unwrap();
    mock.push_rx(&ACK_BAD_PARAM).unwrap();
    mock.push_rx(&ACK_OK).unwrap();
    let mut lidar = Tfmini::new(DeviceId(1), mock);

    assert_eq!(lidar.set_signal_strength_low(10), Status::ErrorParameter);
    assert_eq!(sent(&lidar).last().map(|f| f[..] == EXIT), Some(true));
}

#[test]
fn exit_failure_does_not_change_status() {
    let mut mock = MockTransport::new();
    mock.push_rx(&ACK_OK).unwrap();
    mock.push_rx(&ACK_OK).unwrap();
    let mut lidar = Tfmini::new(DeviceId(1), mock);

    assert_eq!(lidar.set_distance_unit(DistanceUnit::Millimeter), Status::Success);
    assert_eq!(lidar.transport().send_calls(), 3);
}

#[test]
fn self_exiting_commands_send_no_exit_frame() {
    let mut lidar = acking();

    lidar.set_baud_rate(BaudRate::B9600);
    lidar.set_trigger_source(TriggerSource::Internal);
    lidar.trigger_measurement();
    lidar.reset();

    let frames = sent(&lidar);
    assert_eq!(frames.len(), 8);
    assert!(frames.iter().all(|f| f[..] != EXIT));
    assert_eq!(frames[1], [0x42, 0x57, 0x02, 0x00, 0x00, 0x00, 0x00, 0x08]);
    assert_eq!(frames[7], [0x42, 0x57, 0x02, 0x00, 0xFF, 0xFF, 0xFF, 0xFF]);
}

#[test]
fn self_exiting_command_returns_its_own_status() {
    let mut mock = MockTransport::new();
    mock.push_rx(&ACK_OK).unwrap();
    mock.push_rx(&[0x42, 0x57, 0x02, 0xFF]).unwrap();
    let mut lidar = Tfmini::new(DeviceId(1), mock);

    assert_eq!(lidar.set_baud_rate(BaudRate::B57600), Status::ErrorInstruction);
}

#[test]
fn distance_mode_sets_fixed_pattern_first() {
    let mut lidar = acking();
    assert_eq!(lidar.set_distance_mode(DistanceMode::Short15x), Status::Success);

    let frames = sent(&lidar);
    assert_eq!(frames.len(), 6);
    assert_eq!(frames[1], [0x42, 0x57, 0x02, 0x00, 0x00, 0x00, 0x01, 0x14]);
    assert_eq!(frames[4], [0x42, 0x57, 0x02, 0x00, 0x00, 0x00, 0x02, 0x11]);
}

#[test]
fn distance_mode_aborts_when_pattern_fails() {
    let mut mock = MockTransport::new();
    mock.push_rx(&ACK_OK).unwrap();
    mock.push_rx(&ACK_BAD_PARAM).unwrap();
    mock.push_rx(&ACK_OK).unwrap();
    let mut lidar = Tfmini::new(DeviceId(1), mock);

    assert_eq!(lidar.set_distance_mode(DistanceMode::Long), Status::ErrorTransmission);
    // Only the pattern bracket went out
    assert_eq!(lidar.transport().send_calls(), 3);
}

#[test]
fn reads_measurement_from_stream() {
    let mut mock = MockTransport::new();
    mock.push_rx(&[0x59, 0x12, 0x34]).unwrap();
    mock.push_rx(&[0x59, 0x59, 0x2C, 0x01, 0x0A, 0x00, 0x07, 0x00, 0xF0])
        .unwrap();
    let mut lidar = Tfmini::new(DeviceId(1), mock);

    let m = lidar.read_measurement().unwrap();
    assert_eq!(m.reading, 300);
    assert_eq!(m.strength, 10);
    assert!(!m.short_distance);
    assert!(m.is_valid());
    assert_eq!(m.distance_m(DistanceUnit::Centimeter), Some(3.0));
}

#[test]
fn out_of_range_reading_is_dropped() {
    let mut mock = MockTransport::new();
    mock.push_rx(&measurement_frame(0xFFFF, 0, 0x07)).unwrap();
    mock.push_rx(&measurement_frame(42, 100, 0x00)).unwrap();
    let mut lidar = Tfmini::new(DeviceId(1), mock);

    assert_eq!(lidar.read_measurement(), None);
    let next = lidar.read_measurement().unwrap();
    assert_eq!(next.reading, 42);
    assert!(next.short_distance);
}

#[test]
fn corrupted_measurement_is_dropped() {
    let mut frame = measurement_frame(300, 10, 0x07);
    frame[4] ^= 0x40;
    let mut mock = MockTransport::new();
    mock.push_rx(&frame).unwrap();
    let mut lidar = Tfmini::new(DeviceId(1), mock);

    assert_eq!(
        lidar.try_read_measurement(),
        Err(MeasureError::ChecksumMismatch)
    );
}

#[test]
fn search_budget_bounds_measurement_read() {
    let mut mock = MockTransport::new();
    mock.set_idle_byte(Some(0xAA));
    let mut lidar = Tfmini::new(DeviceId(1), mock);
    lidar.set_max_search_attempts(12);

    assert_eq!(
        lidar.try_read_measurement(),
        Err(MeasureError::NotSynchronized)
    );
    assert_eq!(lidar.transport().receive_calls(), 12);
}

#[test]
fn profile_applies_in_order() {
    let mut lidar = acking();
    let profile = SensorProfile {
        output_period_ms: Some(50),
        distance_unit: Some(DistanceUnit::Millimeter),
        distance_mode: Some(DistanceMode::Long),
        detection_pattern: Some(DetectionPattern::Auto),
        ..Default::default()
    };

    assert_eq!(lidar.apply_profile(&profile), Ok(()));

    // period, unit, (fix pattern, mode), pattern
    let commands: Vec<u8> = sent(&lidar)
        .iter()
        .filter(|f| f[..] != ENTER && f[..] != EXIT)
        .map(|f| f[7])
        .collect();
    assert_eq!(commands, [0x07, 0x1A, 0x14, 0x11, 0x14]);

    let table = lidar.command_table();
    assert_eq!(table.frame(Command::DetectionPattern)[6], 0x00);
    assert_eq!(table.frame(Command::DistanceMode)[6], 0x07);
}

#[test]
fn profile_stops_at_first_failure() {
    let mut mock = MockTransport::new();
    // reset ok, then format rejected
    for ack in [ACK_OK, ACK_OK, ACK_OK, ACK_BAD_PARAM, ACK_OK] {
        mock.push_rx(&ack).unwrap();
    }
    let mut lidar = Tfmini::new(DeviceId(1), mock);
    let profile = SensorProfile {
        reset_first: true,
        output_format: Some(OutputDataFormat::Standard),
        distance_unit: Some(DistanceUnit::Centimeter),
        ..Default::default()
    };

    assert_eq!(
        lidar.apply_profile(&profile),
        Err(ProfileError {
            setting: Setting::OutputFormat,
            status: Status::ErrorParameter,
        })
    );
    // reset bracket (2) + format bracket (3); unit never sent
    assert_eq!(lidar.transport().send_calls(), 5);
}

#[test]
fn sessions_on_separate_threads_stay_isolated() {
    let worker = |device: u8, range_mm: u16| {
        thread::spawn(move || {
            let mut lidar = Tfmini::new(DeviceId(device), MockTransport::replying(&ACK_OK));
            for _ in 0..20 {
                assert_eq!(lidar.set_range_limit(range_mm), Status::Success);
            }
            let frames = sent(&lidar);
            let mock = lidar.release();
            (frames, mock.last_device())
        })
    };

    let a = worker(1, 1000);
    let b = worker(2, 5000);
    let (frames_a, device_a) = a.join().unwrap();
    let (frames_b, device_b) = b.join().unwrap();

    assert_eq!(device_a, Some(DeviceId(1)));
    assert_eq!(device_b, Some(DeviceId(2)));

    let range_a = [0x42, 0x57, 0x02, 0x00, 0xE8, 0x03, 0x01, 0x19];
    let range_b = [0x42, 0x57, 0x02, 0x00, 0x88, 0x13, 0x01, 0x19];
    for (frames, own, other) in [(&frames_a, range_a, range_b), (&frames_b, range_b, range_a)] {
        assert_eq!(frames.len(), 60);
        assert_eq!(frames.iter().filter(|f| f[..] == own).count(), 20);
        assert!(frames.iter().all(|f| f[..] != other));
    }
}
