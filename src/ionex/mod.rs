//! IONEX (ionosphere map exchange format) reader.
//!
//! The header is parsed eagerly, maps are decoded one at a time
//! with [IonexReader::next_map], so that only the maps being
//! interpolated are kept in memory.
mod grid;
mod header;
mod interpolation;
mod map;
mod mapf;
mod system;

pub use grid::Grid;
pub use header::{Header, DEFAULT_EXPONENT, SUPPORTED_VERSIONS};
pub use interpolation::TecSeries;
pub use map::{MapKind, TecMap, MISSING_VALUE};
pub use mapf::MappingFunction;
pub use system::{OtherSystem, ReferenceSystem, TheoreticalModel};

use std::{
    fs::File,
    io::{BufRead, BufReader, Seek},
    path::Path,
};

#[cfg(feature = "flate2")]
use std::io::{Cursor, Read};

#[cfg(feature = "flate2")]
use flate2::read::GzDecoder;

#[cfg(feature = "log")]
use log::trace;

use crate::{
    axis::TickAxis,
    epoch::Epoch,
    error::{Error, ParsingError},
    grid::Grid2D,
    line::{Columns, Line, LineReader},
};

use grid::{RowSpecs, COORDINATES_TOLERANCE};
use map::{scale, VALUES_PER_LINE, VALUE_WIDTH};

// START OF .. MAP, EXPONENT
const INDEX: Columns = Columns::new(0, 6);

/// Parses an `EPOCH OF ..` record (6I6).
pub(crate) fn parse_epoch(line: &Line) -> Result<Epoch, ParsingError> {
    let year = line.parse::<i32>(Columns::new(0, 6), "year")?;
    let month = line.parse::<u8>(Columns::new(6, 12), "month")?;
    let day = line.parse::<u8>(Columns::new(12, 18), "day")?;
    let hour = line.parse::<u8>(Columns::new(18, 24), "hour")?;
    let minute = line.parse::<u8>(Columns::new(24, 30), "minute")?;
    let second = line.parse::<u8>(Columns::new(30, 36), "second")?;

    Epoch::from_calendar(year, month, day, hour, minute, second as f64)
        .map_err(|e| line.malformed(e))
}

/// [IonexReader] owns an IONEX stream and the position of its body.
///
/// ```
/// use gridex::prelude::*;
///
/// let mut reader = IonexReader::from_file("data/IONEX/V1/sample.inx")
///     .unwrap();
///
/// let header = reader.header();
/// assert_eq!(header.number_of_maps, 3);
///
/// let map = reader.next_map()
///     .unwrap()
///     .unwrap();
///
/// assert_eq!(map.kind, MapKind::Tec);
/// assert_eq!(map.epoch.to_calendar(), (2022, 1, 2, 0, 0, 0.0));
///
/// // (latitude, longitude) in degrees
/// let tec = map.value(2.5, 2.5, RangeMode::Checked)
///     .unwrap();
///
/// assert!(tec > 0.0);
/// ```
#[derive(Debug)]
pub struct IonexReader<R> {
    reader: LineReader<R>,
    header: Header,
    grid: Grid2D,
    latitudes: TickAxis,
    /// End of header (offset, line number)
    body: (u64, usize),
}

impl IonexReader<BufReader<File>> {
    /// Opens a local IONEX file and parses its [Header].
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
impl IonexReader<Cursor<Vec<u8>>> {
    /// Opens a gzip compressed IONEX file. The content is decompressed
    /// in memory, so the maps can be streamed several times.
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

impl<R: BufRead + Seek> IonexReader<R> {
    /// Builds a new [IonexReader], parsing the [Header] right away.
    pub fn new(inner: R) -> Result<Self, ParsingError> {
        let mut reader = LineReader::new(inner);
        let header = Header::parse(&mut reader)?;
        let body = (reader.position()?, reader.line_number());

        // both were validated by the header
        let invalid = |e: Error| ParsingError::MalformedHeader(format!("invalid map grid: {}", e));
        let grid = header.grid.map_grid().map_err(invalid)?;
        let latitudes = header.grid.latitude_axis().map_err(invalid)?;

        Ok(Self {
            reader,
            header,
            grid,
            latitudes,
            body,
        })
    }

    /// IONEX [Header]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// [Grid2D] shared by all maps of this file.
    pub fn grid(&self) -> &Grid2D {
        &self.grid
    }

    /// Moves back to the first map.
    pub fn rewind(&mut self) -> Result<(), ParsingError> {
        self.reader.seek(self.body.0, self.body.1)
    }

    /// Decodes the next map of any [MapKind].
    /// Returns None at the end of the file.
    pub fn next_map(&mut self) -> Result<Option<TecMap>, ParsingError> {
        loop {
            if !self.reader.advance()? {
                return Ok(None);
            }

            let line = self.reader.line();
            let label = line.label();

            if line.is_blank() || label == "COMMENT" {
                continue;
            }

            if label == "END OF FILE" {
                return Ok(None);
            }

            let kind = MapKind::from_start_label(label).ok_or_else(|| {
                line.malformed(format!("expecting start of map, found \"{}\"", label))
            })?;

            let index = line.parse::<u32>(INDEX, "map index")?;

            return self.parse_map(kind, index).map(Some);
        }
    }

    /// Decodes the next TEC map, skipping RMS and height maps.
    pub fn next_tec_map(&mut self) -> Result<Option<TecMap>, ParsingError> {
        while let Some(map) = self.next_map()? {
            if map.kind == MapKind::Tec {
                return Ok(Some(map));
            }

            #[cfg(feature = "log")]
            trace!("skipped {} map #{}", map.kind, map.index);
        }
        Ok(None)
    }

    /// Decodes a map, right after its `START OF .. MAP` record.
    fn parse_map(&mut self, kind: MapKind, index: u32) -> Result<TecMap, ParsingError> {
        self.reader.advance_or("EPOCH OF CURRENT MAP")?;

        let line = self.reader.line();
        line.expect_label("EPOCH OF CURRENT MAP")?;
        let epoch = parse_epoch(&line)?;

        let longitudes = self.grid.x_axis().count();
        let lines_per_row = longitudes.div_ceil(VALUES_PER_LINE);
        let rows_per_layer = self.latitudes.count();
        let rows = self.header.rows_per_map();

        let mut exponent = self.header.exponent;
        let mut raw = Vec::<i64>::with_capacity(longitudes * rows_per_layer);
        let mut row = 0;

        loop {
            self.reader.advance_or(kind.end_label())?;

            let line = self.reader.line();
            let label = line.label();

            if label == kind.end_label() {
                if row != rows {
                    return Err(line.malformed(format!(
                        "{} map #{}: expecting {} rows, found {}",
                        kind, index, rows, row
                    )));
                }
                break;
            }

            match label {
                "EXPONENT" => {
                    exponent = line.parse(INDEX, "exponent")?;
                    continue;
                },
                "COMMENT" => continue,
                "LAT/LON1/LON2/DLON/H" => self.check_row(&line, row)?,
                _ => {
                    return Err(line.malformed(format!(
                        "unexpected \"{}\" within {} map #{}",
                        label, kind, index
                    )))
                },
            }

            // only the lowest layer is retained
            let retained = row < rows_per_layer;
            let mut remaining = longitudes;

            for _ in 0..lines_per_row {
                self.reader.advance_or("map values")?;
                let line = self.reader.line();

                let count = remaining.min(VALUES_PER_LINE);
                let values = line.parse_series::<i64>(0, VALUE_WIDTH, count, "value")?;
                remaining -= count;

                if retained {
                    raw.extend(values);
                }
            }

            row += 1;
        }

        #[cfg(feature = "log")]
        trace!("{} map #{} ({}), exponent {}", kind, index, epoch, exponent);

        Ok(TecMap {
            kind,
            index,
            epoch,
            exponent,
            grid: self.grid,
            values: raw.into_iter().map(|raw| scale(raw, exponent)).collect(),
        })
    }

    /// Verifies that the `row`-th row of a map matches the header [Grid].
    fn check_row(&self, line: &Line, row: usize) -> Result<(), ParsingError> {
        if row >= self.header.rows_per_map() {
            return Err(line.malformed("too many rows"));
        }

        let specs = RowSpecs::parse(line)?;

        let expected = self.latitudes.tick_at(row % self.latitudes.count());

        if (specs.latitude - expected).abs() > COORDINATES_TOLERANCE {
            return Err(line.malformed(format!(
                "expecting latitude {}, found {}",
                expected, specs.latitude
            )));
        }

        if !specs
            .longitude
            .matches(&self.header.grid.longitude, COORDINATES_TOLERANCE)
        {
            return Err(line.malformed("longitude space differs from header"));
        }

        Ok(())
    }
}
