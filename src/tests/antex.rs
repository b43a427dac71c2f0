use std::io::Cursor;

use crate::{
    prelude::*,
    tests::toolkit::{antex_antenna, antex_header, assert_close, record},
};

#[cfg(feature = "log")]
use crate::tests::init_logger;

fn name(model: &str, radome: &str) -> String {
    format!("{:<15} {:<4}", model, radome)
}

fn zenith_only(zenith: f64, _: f64, _: usize) -> f64 {
    zenith / 5.0
}

fn linear(zenith: f64, azimuth: f64, frequency: usize) -> f64 {
    -zenith / 10.0 + azimuth / 100.0 + frequency as f64
}

fn sample_content() -> String {
    [
        antex_header("1.4", 'M', "A", ""),
        antex_antenna(
            &name("AOAD/M_T", "NONE"),
            "",
            0.0,
            (0.0, 90.0, 5.0),
            &["G01"],
            zenith_only,
        ),
        antex_antenna(
            &name("TRM59800.00", "SCIS"),
            "",
            90.0,
            (0.0, 90.0, 10.0),
            &["G01", "G02"],
            linear,
        ),
        antex_antenna(
            &name("TRM59800.00", "NONE"),
            "12345",
            90.0,
            (0.0, 80.0, 10.0),
            &["G01"],
            linear,
        ),
    ]
    .concat()
}

fn reader(content: String) -> AntexReader<Cursor<Vec<u8>>> {
    AntexReader::new(Cursor::new(content.into_bytes())).unwrap()
}

#[test]
fn antenna_listing() {
    #[cfg(feature = "log")]
    init_logger();

    let mut reader = reader(sample_content());

    assert_eq!(reader.header().version, Version::new(1, 4));
    assert_eq!(reader.header().constellation, Constellation::Mixed);

    let antennas = reader.antennas().unwrap();
    assert_eq!(antennas.len(), 3);

    assert_eq!(antennas[0].model, "AOAD/M_T");
    assert_eq!(antennas[0].radome, "NONE");
    assert_eq!(antennas[1].radome, "SCIS");
    assert_eq!(antennas[2].serial, "12345");

    // listing is repeatable
    assert_eq!(reader.antennas().unwrap(), antennas);
}

#[test]
fn zenith_only_pattern() {
    let mut reader = reader(sample_content());

    let pattern = reader
        .antenna_pattern(&Antenna::new("AOAD/M_T", "NONE"))
        .unwrap();

    assert!(!pattern.is_azimuth_dependent());
    assert!(pattern.azimuth_axis().is_none());
    assert_eq!(pattern.antenna.model, "AOAD/M_T");
    assert_eq!(pattern.calibration.sinex_code.as_deref(), Some("IGS14_2035"));
    assert_eq!(pattern.frequencies.len(), 1);

    let frequency = &pattern.frequencies[0];
    assert_eq!(frequency.id, FrequencyId::new(Constellation::GPS, 1));
    assert_eq!(frequency.north, 1.0);
    assert_eq!(frequency.east, -0.5);
    assert_eq!(frequency.up, 60.0);
    assert_eq!(frequency.noazi.len(), 19);
    assert!(frequency.azimuth.is_empty());

    // azimuth has no effect
    for azimuth in [0.0, 123.0, 359.0] {
        let pcv = pattern.value(12.5, azimuth, 0, RangeMode::Checked).unwrap();
        assert_close(pcv, 2.5, 1.0E-9);
    }

    assert_eq!(pattern.nearest(11.0, 0.0, 0).unwrap(), 2.0);
    assert!(pattern.value(91.0, 0.0, 0, RangeMode::Checked).is_err());
}

#[test]
fn azimuth_dependent_pattern() {
    let mut reader = reader(sample_content());

    let pattern = reader
        .antenna_pattern(&Antenna::new("TRM59800.00", "SCIS"))
        .unwrap();

    assert!(pattern.is_azimuth_dependent());
    assert_eq!(pattern.frequencies.len(), 2);

    let l2 = FrequencyId::new(Constellation::GPS, 2);
    let frequency = pattern.frequency(&l2).unwrap();
    assert_eq!(frequency.up, 61.0);

    // 10 zenith ticks x 5 azimuth ticks
    assert_eq!(frequency.azimuth.len(), 50);

    let pcv = pattern.value(15.0, 45.0, 1, RangeMode::Checked).unwrap();
    assert_close(pcv, -0.05, 1.0E-9);

    // azimuth wraps around
    let wrapped = pattern.value(15.0, 405.0, 1, RangeMode::Checked).unwrap();
    assert_close(wrapped, pcv, 1.0E-9);

    // closest calibrated angles: 10° zenith, 90° azimuth
    assert_close(pattern.nearest(14.0, 50.0, 0).unwrap(), -0.1, 1.0E-9);

    // zenith only values
    let noazi = pattern.noazi_value(15.0, 0, RangeMode::Checked).unwrap();
    assert_close(noazi, -1.5, 1.0E-9);

    match pattern.value(15.0, 45.0, 2, RangeMode::Checked) {
        Err(Error::UnknownFrequency(2)) => {},
        other => panic!("expecting unknown frequency, got {:?}", other),
    }

    let samples = pattern.sample(45.0, 180.0, 0).unwrap();
    assert_eq!(samples.len(), 9);
    assert_eq!(samples[0], (0.0, 0.0, 0.0));
}

#[test]
fn antenna_matching() {
    let mut reader = reader(sample_content());

    let unknown = Antenna::new("LEIAR25.R4", "LEIT");
    match reader.find_antenna(&unknown, AntennaMatch::ModelAndRadome) {
        Err(Error::AntennaNotFound(_)) => {},
        other => panic!("expecting antenna not found, got {:?}", other),
    }

    let serial = Antenna::new("TRM59800.00", "NONE").with_serial("12345");
    let found = reader.find_antenna(&serial, AntennaMatch::Strict).unwrap();
    assert_eq!(found.serial, "12345");

    let pattern = reader.read_pattern().unwrap();
    assert_eq!(pattern.antenna, found);
    assert_eq!(pattern.zen2, 80.0);

    let wrong_serial = Antenna::new("TRM59800.00", "NONE").with_serial("999");
    assert!(reader.find_antenna(&wrong_serial, AntennaMatch::Strict).is_err());

    // serial number ignored
    let found = reader
        .find_antenna(&wrong_serial, AntennaMatch::ModelAndRadome)
        .unwrap();
    assert_eq!(found.serial, "12345");
}

#[test]
fn rms_blocks_are_skipped() {
    let end_of_frequency = record("   G01", "END OF FREQUENCY");

    let rms = [
        end_of_frequency.clone(),
        record("   G01", "START OF FREQ RMS"),
        record(
            &format!("{:>10.2}{:>10.2}{:>10.2}", 0.1, 0.1, 0.2),
            "NORTH / EAST / UP",
        ),
        format!("   NOAZI{:>8.2}{:>8.2}\n", 0.05, 0.05),
        record("   G01", "END OF FREQ RMS"),
    ]
    .concat();

    let content = sample_content().replacen(&end_of_frequency, &rms, 1);
    let mut reader = reader(content);

    let pattern = reader
        .antenna_pattern(&Antenna::new("AOAD/M_T", "NONE"))
        .unwrap();

    assert_eq!(pattern.frequencies.len(), 1);
    assert_close(pattern.frequencies[0].noazi[1], 1.0, 1.0E-9);

    // following antennas remain reachable
    assert_eq!(reader.antennas().unwrap().len(), 3);
}

#[test]
fn truncated_antenna() {
    let content = sample_content();
    let end = content.rfind(&record("", "END OF ANTENNA")).unwrap();

    let mut reader = reader(content[..end].to_string());

    assert!(reader.antennas().is_err());

    let pattern = reader.antenna_pattern(&Antenna::new("TRM59800.00", "SCIS"));
    assert!(pattern.is_ok());

    let pattern = reader.antenna_pattern(&Antenna::new("TRM59800.00", "NONE"));
    assert!(pattern.is_err());
}

#[test]
fn unsupported_revision() {
    let content = antex_header("1.3", 'G', "A", "");
    match AntexReader::new(Cursor::new(content.into_bytes())) {
        Err(ParsingError::UnsupportedVersion(version)) => assert_eq!(version, "1.3"),
        other => panic!("expecting unsupported version, got {:?}", other),
    }
}

#[test]
fn sample_file() {
    #[cfg(feature = "log")]
    init_logger();

    let mut reader = AntexReader::from_file("data/ANTEX/igs14_sample.atx").unwrap();

    assert_eq!(reader.header().version, Version::new(1, 4));
    assert_eq!(reader.header().pcv_type, PcvType::Absolute);

    let antennas = reader.antennas().unwrap();
    assert_eq!(antennas.len(), 3);

    // satellite antenna
    assert!(antennas[0].svn.is_some());
    assert!(antennas[0].cospar.is_some());

    let pattern = reader
        .antenna_pattern(&Antenna::new("TRM59800.00", "SCIS"))
        .unwrap();

    assert_eq!(pattern.frequencies.len(), 2);
    assert!(pattern.is_azimuth_dependent());

    for (zenith, azimuth) in [(0.0, 0.0), (12.5, 45.0), (47.3, 271.9), (85.0, 359.0)] {
        let pcv = pattern.value(zenith, azimuth, 1, RangeMode::Checked).unwrap();
        assert!(pcv.abs() < 10.0, "unrealistic PCV {} at ({}, {})", pcv, zenith, azimuth);
    }

    let pattern = reader
        .antenna_pattern(&Antenna::new("AOAD/M_T", "NONE"))
        .unwrap();

    assert!(!pattern.is_azimuth_dependent());
}

#[test]
fn missing_file() {
    match AntexReader::from_file("data/ANTEX/missing.atx") {
        Err(ParsingError::CannotOpen { path, .. }) => assert!(path.ends_with("missing.atx")),
        other => panic!("expecting open failure, got {:?}", other),
    }
}

#[test]
fn implicit_radome() {
    let content = [
        antex_header("1.4", 'G', "A", ""),
        antex_antenna("AAAA", "", 0.0, (0.0, 30.0, 10.0), &["G01"], zenith_only),
        antex_antenna(
            &name("BBBB", "DOME"),
            "",
            0.0,
            (0.0, 80.0, 5.0),
            &["G01"],
            zenith_only,
        ),
    ]
    .concat();

    let mut reader = reader(content);

    let pattern = reader.antenna_pattern(&Antenna::new("AAAA", "")).unwrap();
    assert_eq!(pattern.antenna.radome, "NONE");
    assert_eq!((pattern.zen1, pattern.zen2, pattern.dzen), (0.0, 30.0, 10.0));

    let pattern = reader.antenna_pattern(&Antenna::new("BBBB", "DOME")).unwrap();
    assert_eq!(pattern.zen2, 80.0);

    // antenna lookups are independent
    assert!(reader.antenna_pattern(&Antenna::new("CCCC", "")).is_err());
    assert!(reader.antenna_pattern(&Antenna::new("AAAA", "NONE")).is_ok());
}
