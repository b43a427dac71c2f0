//! ANTEX (antenna exchange format) reader.
//!
//! The header is parsed eagerly, antenna blocks are parsed on demand:
//! each lookup scans forward from the end of the header.
mod antenna;
mod frequency;
mod header;
mod pattern;

pub use antenna::{Antenna, AntennaMatch, Calibration, CalibrationMethod, NO_RADOME};
pub use frequency::FrequencyId;
pub use header::{Header, PcvType, SUPPORTED_VERSION};
pub use pattern::{AntennaPattern, FrequencyPattern};

use std::{
    fs::File,
    io::{BufRead, BufReader, Seek},
    path::Path,
    str::FromStr,
};

#[cfg(feature = "flate2")]
use std::io::{Cursor, Read};

#[cfg(feature = "flate2")]
use flate2::read::GzDecoder;

#[cfg(feature = "log")]
use log::{debug, trace};

use crate::{
    axis::TickAxis,
    error::{Error, ParsingError},
    line::{Columns, LineReader},
};

use antenna::parse_validity;
use pattern::{AZIMUTH_START, AZIMUTH_STOP};

// DAZI
const DAZI: Columns = Columns::new(2, 8);

// ZEN1 / ZEN2 / DZEN
const ZEN1: Columns = Columns::new(2, 8);
const ZEN2: Columns = Columns::new(8, 14);
const DZEN: Columns = Columns::new(14, 20);

// # OF FREQUENCIES
const NUM_FREQUENCIES: Columns = Columns::new(0, 6);

// START OF FREQUENCY
const FREQUENCY_ID: Columns = Columns::new(3, 6);

// NORTH / EAST / UP
const NORTH: Columns = Columns::new(0, 10);
const EAST: Columns = Columns::new(10, 20);
const UP: Columns = Columns::new(20, 30);

// SINEX CODE
const SINEX_CODE: Columns = Columns::new(0, 10);

// pattern lines: 3X,A5 (NOAZI) or F8.1 (azimuth), followed by mF8.2
const NOAZI_TAG: Columns = Columns::new(3, 8);
const AZIMUTH_LABEL: Columns = Columns::new(0, 8);
const VALUES_START: usize = 8;
const VALUE_WIDTH: usize = 8;

/// Azimuth labels must match the expected tick within this tolerance.
const AZIMUTH_TOLERANCE: f64 = 1.0E-3;

/// Optional records that may appear between frequency blocks.
enum Optional {
    /// Record was consumed
    Consumed,

    /// Record is not optional and should be interpreted by the caller
    Other,
}

/// [AntexReader] owns an ANTEX stream and the position of its body.
///
/// ```
/// use gridex::prelude::*;
///
/// let mut reader = AntexReader::from_file("data/ANTEX/igs14_sample.atx")
///     .unwrap();
///
/// assert_eq!(reader.header().version, Version::new(1, 4));
///
/// // every antenna in the file
/// let antennas = reader.antennas()
///     .unwrap();
///
/// assert_eq!(antennas.len(), 3);
///
/// let antenna = Antenna::new("TRM59800.00", "SCIS");
/// let matched = reader.find_antenna(&antenna, AntennaMatch::ModelAndRadome)
///     .unwrap();
///
/// assert_eq!(matched.model, "TRM59800.00");
///
/// let pattern = reader.read_pattern()
///     .unwrap();
///
/// assert_eq!(pattern.frequencies.len(), 2);
/// ```
#[derive(Debug)]
pub struct AntexReader<R> {
    reader: LineReader<R>,
    header: Header,
    /// End of header (offset, line number)
    body: (u64, usize),
    /// Antenna identified by the last successful [AntexReader::find_antenna]
    current: Option<Antenna>,
}

impl AntexReader<BufReader<File>> {
    /// Opens a local ANTEX file and parses its [Header].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ParsingError> {
        let path = path.as_ref();

        let fd = File::open(path).map_err(|source| ParsingError::CannotOpen {
            path: path.to_string_lossy().to_string(),
            source,
        })?;

        Self::new(BufReader::new(fd))
    }
}

#[cfg(feature = "flate2")]
#[cfg_attr(docsrs, doc(cfg(feature = "flate2")))]
impl AntexReader<Cursor<Vec<u8>>> {
    /// Opens a gzip compressed ANTEX file. The content is decompressed
    /// in memory, so the body can be scanned several times.
    pub fn from_gzip_file<P: AsRef<Path>>(path: P) -> Result<Self, ParsingError> {
        let path = path.as_ref();

        let fd = File::open(path).map_err(|source| ParsingError::CannotOpen {
            path: path.to_string_lossy().to_string(),
            source,
        })?;

        let mut content = Vec::new();
        GzDecoder::new(fd).read_to_end(&mut content)?;

        Self::new(Cursor::new(content))
    }
}

impl<R: BufRead + Seek> AntexReader<R> {
    /// Builds a new [AntexReader], parsing the [Header] right away.
    pub fn new(inner: R) -> Result<Self, ParsingError> {
        let mut reader = LineReader::new(inner);
        let header = Header::parse(&mut reader)?;
        let body = (reader.position()?, reader.line_number());
        Ok(Self {
            reader,
            header,
            body,
            current: None,
        })
    }

    /// ANTEX [Header]
    pub fn header(&self) -> &Header {
        &self.header
    }

    fn rewind(&mut self) -> Result<(), ParsingError> {
        self.current = None;
        self.reader.seek(self.body.0, self.body.1)
    }

    /// Moves to the next `START OF ANTENNA` + `TYPE / SERIAL NO` pair.
    /// Returns None at end of stream.
    fn next_antenna(&mut self) -> Result<Option<Antenna>, ParsingError> {
        loop {
            if !self.reader.advance()? {
                return Ok(None);
            }

            let line = self.reader.line();

            if line.is_blank() {
                continue;
            }

            line.expect_label("START OF ANTENNA")?;

            self.reader.advance_or("TYPE / SERIAL NO")?;

            let line = self.reader.line();
            line.expect_label("TYPE / SERIAL NO")?;

            return Ok(Some(Antenna::from_record(&line)));
        }
    }

    /// Scans the body for `antenna`, from the end of the header.
    /// On success, the matching [Antenna] (including its serial number) is returned
    /// and the stream is positioned so that [Self::read_pattern] returns its pattern.
    pub fn find_antenna(
        &mut self,
        antenna: &Antenna,
        policy: AntennaMatch,
    ) -> Result<Antenna, Error> {
        self.rewind()?;

        #[cfg(feature = "log")]
        let mut skipped = 0;

        while let Some(candidate) = self.next_antenna()? {
            if candidate.matches(antenna, policy) {
                #[cfg(feature = "log")]
                debug!("found {} ({} antennas skipped)", candidate, skipped);

                self.current = Some(candidate.clone());
                return Ok(candidate);
            }

            #[cfg(feature = "log")]
            {
                trace!("skipping {}", candidate);
                skipped += 1;
            }

            self.skip_pattern()?;
        }

        Err(Error::AntennaNotFound(antenna.to_string()))
    }

    /// Lists all antennas described in this file, in order of appearance.
    pub fn antennas(&mut self) -> Result<Vec<Antenna>, ParsingError> {
        self.rewind()?;

        let mut antennas = Vec::new();

        while let Some(antenna) = self.next_antenna()? {
            antennas.push(antenna);
            self.skip_pattern()?;
        }

        self.rewind()?;
        Ok(antennas)
    }

    /// Locates `antenna` (model and radome) and reads its [AntennaPattern].
    pub fn antenna_pattern(&mut self, antenna: &Antenna) -> Result<AntennaPattern, Error> {
        self.find_antenna(antenna, AntennaMatch::ModelAndRadome)?;
        Ok(self.read_pattern()?)
    }

    /// Skips the remainder of the current antenna block, validating its structure.
    pub fn skip_pattern(&mut self) -> Result<(), ParsingError> {
        self.parse_block().map(|_| ())
    }

    /// Reads the remainder of the current antenna block, right after
    /// its `TYPE / SERIAL NO` record. Any structural mismatch aborts the read.
    pub fn read_pattern(&mut self) -> Result<AntennaPattern, ParsingError> {
        let mut pattern = self.parse_block()?;
        if let Some(antenna) = self.current.take() {
            pattern.antenna = antenna;
        }
        Ok(pattern)
    }

    /// Consumes optional records, returns [Optional::Other] for anything else.
    fn optional_record(&mut self, pattern: &mut AntennaPattern) -> Result<Optional, ParsingError> {
        if self.reader.line().label() == "START OF FREQ RMS" {
            self.skip_rms()?;
            return Ok(Optional::Consumed);
        }

        let line = self.reader.line();

        match line.label() {
            "VALID FROM" => pattern.calibration.valid_from = Some(parse_validity(&line)?),
            "VALID UNTIL" => pattern.calibration.valid_until = Some(parse_validity(&line)?),
            "SINEX CODE" => {
                pattern.calibration.sinex_code = Some(line.field(SINEX_CODE).trim().to_string())
            },
            "COMMENT" => {},
            _ => return Ok(Optional::Other),
        }

        Ok(Optional::Consumed)
    }

    /// Skips a `START OF FREQ RMS` .. `END OF FREQ RMS` block.
    fn skip_rms(&mut self) -> Result<(), ParsingError> {
        loop {
            self.reader.advance_or("END OF FREQ RMS")?;

            let line = self.reader.line();

            match line.label() {
                "END OF FREQ RMS" => return Ok(()),
                "END OF ANTENNA" | "START OF ANTENNA" => {
                    return Err(line.malformed("unterminated FREQ RMS block"));
                },
                _ => {},
            }
        }
    }

    fn parse_block(&mut self) -> Result<AntennaPattern, ParsingError> {
        self.reader.advance_or("METH / BY / # / DATE")?;
        let calibration = Calibration::from_record(&self.reader.line())?;

        self.reader.advance_or("DAZI")?;
        let line = self.reader.line();
        line.expect_label("DAZI")?;
        let dazi = line.parse::<f64>(DAZI, "DAZI")?;

        let azimuth = if dazi == 0.0 {
            None
        } else {
            Some(
                TickAxis::new(AZIMUTH_START, AZIMUTH_STOP, dazi)
                    .map_err(|e| line.malformed(e))?,
            )
        };

        self.reader.advance_or("ZEN1 / ZEN2 / DZEN")?;
        let line = self.reader.line();
        line.expect_label("ZEN1 / ZEN2 / DZEN")?;
        let zen1 = line.parse::<f64>(ZEN1, "ZEN1")?;
        let zen2 = line.parse::<f64>(ZEN2, "ZEN2")?;
        let dzen = line.parse::<f64>(DZEN, "DZEN")?;
        let zenith = TickAxis::new(zen1, zen2, dzen).map_err(|e| line.malformed(e))?;

        self.reader.advance_or("# OF FREQUENCIES")?;
        let line = self.reader.line();
        line.expect_label("# OF FREQUENCIES")?;
        let num_frequencies = line.parse::<usize>(NUM_FREQUENCIES, "number of frequencies")?;

        let mut pattern = AntennaPattern {
            antenna: Antenna::default(),
            calibration,
            dazi,
            zen1,
            zen2,
            dzen,
            frequencies: Vec::with_capacity(num_frequencies),
        };

        for _ in 0..num_frequencies {
            loop {
                self.reader.advance_or("START OF FREQUENCY")?;
                if let Optional::Other = self.optional_record(&mut pattern)? {
                    break;
                }
            }

            let frequency = self.parse_frequency(&zenith, azimuth.as_ref())?;
            pattern.frequencies.push(frequency);
        }

        loop {
            self.reader.advance_or("END OF ANTENNA")?;
            if let Optional::Other = self.optional_record(&mut pattern)? {
                break;
            }
        }

        self.reader.line().expect_label("END OF ANTENNA")?;

        Ok(pattern)
    }

    /// Parses one frequency block, starting on its `START OF FREQUENCY` record.
    fn parse_frequency(
        &mut self,
        zenith: &TickAxis,
        azimuth: Option<&TickAxis>,
    ) -> Result<FrequencyPattern, ParsingError> {
        let line = self.reader.line();
        line.expect_label("START OF FREQUENCY")?;

        let id = FrequencyId::from_str(line.field(FREQUENCY_ID))
            .map_err(|e| line.malformed(format!("frequency identifier: {}", e)))?;

        self.reader.advance_or("NORTH / EAST / UP")?;
        let line = self.reader.line();
        line.expect_label("NORTH / EAST / UP")?;
        let north = line.parse::<f64>(NORTH, "north offset")?;
        let east = line.parse::<f64>(EAST, "east offset")?;
        let up = line.parse::<f64>(UP, "up offset")?;

        let num_zenith = zenith.count();

        self.reader.advance_or("NOAZI")?;
        let line = self.reader.line();
        if line.field(NOAZI_TAG) != "NOAZI" {
            return Err(line.malformed("expecting NOAZI values"));
        }

        let noazi = line.parse_series::<f64>(VALUES_START, VALUE_WIDTH, num_zenith, "NOAZI")?;

        let mut values = Vec::new();

        if let Some(azimuth) = azimuth {
            values.reserve(azimuth.count() * num_zenith);

            for tick in azimuth.ticks() {
                self.reader.advance_or("azimuth dependent values")?;
                let line = self.reader.line();

                let label = line.parse::<f64>(AZIMUTH_LABEL, "azimuth")?;

                if (label - tick).abs() > AZIMUTH_TOLERANCE {
                    return Err(line.malformed(format!(
                        "expecting azimuth {:.1}, found {:.1}",
                        tick, label
                    )));
                }

                values.extend(line.parse_series::<f64>(
                    VALUES_START,
                    VALUE_WIDTH,
                    num_zenith,
                    "PCV",
                )?);
            }
        }

        self.reader.advance_or("END OF FREQUENCY")?;
        self.reader.line().expect_label("END OF FREQUENCY")?;

        Ok(FrequencyPattern {
            id,
            north,
            east,
            up,
            noazi,
            azimuth: values,
        })
    }
}
