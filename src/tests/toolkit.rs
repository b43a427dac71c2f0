//! Fixed column ANTEX and IONEX content builders
use crate::axis::TickAxis;

/// Formats one labelled record: content padded to 60 columns, followed by its label.
pub fn record(content: &str, label: &str) -> String {
    format!("{:<60}{}\n", content, label)
}

/// Panics unless `value` is within `tolerance` of `expected`.
pub fn assert_close(value: f64, expected: f64, tolerance: f64) {
    assert!(
        (value - expected).abs() <= tolerance,
        "{} differs from {} by more than {}",
        value,
        expected,
        tolerance
    );
}

/// ANTEX header: version, system, PCV type (with optional reference antenna),
/// one comment and END OF HEADER.
pub fn antex_header(version: &str, system: char, pcv: &str, refant: &str) -> String {
    [
        record(
            &format!("{:>8}{:12}{}", version, "", system),
            "ANTEX VERSION / SYST",
        ),
        record(&format!("{:<20}{:<20}", pcv, refant), "PCV TYPE / REFANT"),
        record("sample ANTEX file", "COMMENT"),
        record("", "END OF HEADER"),
    ]
    .concat()
}

/// Complete antenna block. `name` follows the TYPE / SERIAL NO layout
/// (model in 15 columns, radome in columns 17-20). `pcv(zenith, azimuth, frequency)`
/// generates the values, NOAZI values are generated at null azimuth.
pub fn antex_antenna(
    name: &str,
    serial: &str,
    dazi: f64,
    zenith: (f64, f64, f64),
    frequencies: &[&str],
    pcv: fn(f64, f64, usize) -> f64,
) -> String {
    let zenith_axis = TickAxis::new(zenith.0, zenith.1, zenith.2).unwrap();

    let values = |azimuth: f64, frequency: usize| {
        zenith_axis
            .ticks()
            .map(|zen| format!("{:>8.2}", pcv(zen, azimuth, frequency)))
            .collect::<String>()
    };

    let mut block = vec![
        record("", "START OF ANTENNA"),
        record(&format!("{:<20}{:<20}", name, serial), "TYPE / SERIAL NO"),
        record(
            &format!("{:<20}{:<20}{:>6}{:4}{:<10}", "ROBOT", "Geo++ GmbH", 2, "", "25-MAR-11"),
            "METH / BY / # / DATE",
        ),
        record(&format!("  {:>6.1}", dazi), "DAZI"),
        record(
            &format!("  {:>6.1}{:>6.1}{:>6.1}", zenith.0, zenith.1, zenith.2),
            "ZEN1 / ZEN2 / DZEN",
        ),
        record(&format!("{:>6}", frequencies.len()), "# OF FREQUENCIES"),
        record("IGS14_2035", "SINEX CODE"),
    ];

    for (index, frequency) in frequencies.iter().enumerate() {
        block.push(record(&format!("   {}", frequency), "START OF FREQUENCY"));
        block.push(record(
            &format!(
                "{:>10.2}{:>10.2}{:>10.2}",
                1.0 + index as f64,
                -0.5,
                60.0 + index as f64
            ),
            "NORTH / EAST / UP",
        ));
        block.push(format!("   NOAZI{}\n", values(0.0, index)));

        if dazi > 0.0 {
            for azimuth in TickAxis::new(0.0, 360.0, dazi).unwrap().ticks() {
                block.push(format!("{:>8.1}{}\n", azimuth, values(azimuth, index)));
            }
        }

        block.push(record(&format!("   {}", frequency), "END OF FREQUENCY"));
    }

    block.push(record("", "END OF ANTENNA"));
    block.concat()
}

/// IONEX header announcing 2 hourly maps on 2022-01-02, from 00:00 to 01:00,
/// over the `latitude` and `longitude` spaces, at 450 km.
pub fn ionex_header(
    version: &str,
    latitude: (f64, f64, f64),
    longitude: (f64, f64, f64),
    exponent: Option<i8>,
) -> String {
    let space = |(start, end, spacing): (f64, f64, f64)| {
        format!("  {:>6.1}{:>6.1}{:>6.1}", start, end, spacing)
    };

    let mut header = vec![
        record(
            &format!("{:>8}{:12}{:<20}{:<20}", version, "", "IONOSPHERE MAPS", "GNS"),
            "IONEX VERSION / TYPE",
        ),
        record(
            &format!("{:<20}{:<20}{:<20}", "gridex", "nav-solutions", "02-JAN-22 00:00"),
            "PGM / RUN BY / DATE",
        ),
        record("synthetic TEC maps", "DESCRIPTION"),
        record(&epoch((2022, 1, 2, 0, 0)), "EPOCH OF FIRST MAP"),
        record(&epoch((2022, 1, 2, 1, 0)), "EPOCH OF LAST MAP"),
        record(&format!("{:>6}", 3600), "INTERVAL"),
        record(&format!("{:>6}", 2), "# OF MAPS IN FILE"),
        record("  COSZ", "MAPPING FUNCTION"),
        record(&format!("{:>8.1}", 0.0), "ELEVATION CUTOFF"),
        record("synthetic", "OBSERVABLES USED"),
        record(&format!("{:>6}", 150), "# OF STATIONS"),
        record(&format!("{:>6}", 56), "# OF SATELLITES"),
        record(&format!("{:>8.1}", 6371.0), "BASE RADIUS"),
        record(&format!("{:>6}", 2), "MAP DIMENSION"),
        record(&space((450.0, 450.0, 0.0)), "HGT1 / HGT2 / DHGT"),
        record(&space(latitude), "LAT1 / LAT2 / DLAT"),
        record(&space(longitude), "LON1 / LON2 / DLON"),
    ];

    if let Some(exponent) = exponent {
        header.push(record(&format!("{:>6}", exponent), "EXPONENT"));
    }

    header.push(record(
        "TEC values in 0.1 TECU; 9999 if no value available",
        "COMMENT",
    ));
    header.push(record("", "END OF HEADER"));
    header.concat()
}

/// `EPOCH OF ..` content (6I6) for (year, month, day, hour, minute).
pub fn epoch((year, month, day, hour, minute): (i32, u8, u8, u8, u8)) -> String {
    format!(
        "{:>6}{:>6}{:>6}{:>6}{:>6}{:>6}",
        year, month, day, hour, minute, 0
    )
}

/// One map of `kind` ("TEC", "RMS" or "HEIGHT"): one row of raw values per latitude.
pub fn tec_map(
    kind: &str,
    index: u32,
    date: (i32, u8, u8, u8, u8),
    longitude: (f64, f64, f64),
    latitudes: &[f64],
    rows: &[&[i64]],
) -> String {
    let mut map = vec![
        record(&format!("{:>6}", index), &format!("START OF {} MAP", kind)),
        record(&epoch(date), "EPOCH OF CURRENT MAP"),
    ];

    for (latitude, row) in latitudes.iter().zip(rows.iter()) {
        map.push(record(
            &format!(
                "  {:>6.1}{:>6.1}{:>6.1}{:>6.1}{:>6.1}",
                latitude, longitude.0, longitude.1, longitude.2, 450.0
            ),
            "LAT/LON1/LON2/DLON/H",
        ));

        for chunk in row.chunks(16) {
            let line = chunk
                .iter()
                .map(|value| format!("{:>5}", value))
                .collect::<String>();
            map.push(format!("{}\n", line));
        }
    }

    map.push(record(&format!("{:>6}", index), &format!("END OF {} MAP", kind)));
    map.concat()
}

/// Complete IONEX V1 file made of `maps`.
pub fn ionex_file(
    latitude: (f64, f64, f64),
    longitude: (f64, f64, f64),
    maps: &[String],
) -> String {
    ionex_header("1.0", latitude, longitude, None) + &maps.concat() + &record("", "END OF FILE")
}
