use std::{
    io::{BufRead, Seek},
    str::FromStr,
};

use hifitime::Duration;

use crate::{
    epoch::Epoch,
    error::ParsingError,
    ionex::{
        grid::{parse_linspace, Grid},
        mapf::MappingFunction,
        parse_epoch,
        system::ReferenceSystem,
    },
    line::{Columns, LineReader},
    linspace::Linspace,
    version::Version,
};

#[cfg(feature = "log")]
use log::{debug, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Supported IONEX revisions
pub const SUPPORTED_VERSIONS: [Version; 2] = [Version::new(1, 0), Version::new(1, 1)];

/// Exponent applied to map values when the file does not declare one.
pub const DEFAULT_EXPONENT: i8 = -1;

/// END OF HEADER must be found within this many records.
const MAX_HEADER_LINES: usize = 10_000;

// IONEX VERSION / TYPE
const VERSION: Columns = Columns::new(0, 8);
const FILE_TYPE: Columns = Columns::new(20, 21);
const SYSTEM: Columns = Columns::new(40, 43);

// PGM / RUN BY / DATE
const PROGRAM: Columns = Columns::new(0, 20);
const RUN_BY: Columns = Columns::new(20, 40);
const DATE: Columns = Columns::new(40, 60);

const INTEGER: Columns = Columns::new(0, 6);
const FLOAT: Columns = Columns::new(0, 8);
const MAPPING_FUNCTION: Columns = Columns::new(2, 6);

/// IONEX file [Header]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Header {
    /// File [Version]
    pub version: Version,

    /// Name of production software
    pub program: Option<String>,

    /// Name of operator (usually name of agency) running this software.
    pub run_by: Option<String>,

    /// Product date and time as readable string
    pub date: Option<String>,

    /// Possible file license
    pub license: Option<String>,

    /// Possible Digital Object ID (DOI)
    pub doi: Option<String>,

    /// Total number of maps described.
    pub number_of_maps: u32,

    /// Number of ground stations that contributed to this estimate
    pub num_stations: Option<u32>,

    /// Number of satellites that contributed to this estimate
    pub num_satellites: Option<u32>,

    /// [Epoch] of first map.
    pub epoch_of_first_map: Epoch,

    /// [Epoch] of last map.
    pub epoch_of_last_map: Epoch,

    /// [ReferenceSystem] used in the evaluation of the TEC maps.
    pub reference_system: ReferenceSystem,

    /// Brief description of the technique or model.
    pub description: Vec<String>,

    /// Observables used in the evaluation, empty for theoretical models.
    pub observables: Option<String>,

    /// Mapping function adopted for TEC determination
    pub mapf: MappingFunction,

    /// Maps dimension, can either be 2D (= fixed altitude mode), or 3D
    pub map_dimension: u8,

    /// Mean earth radius or bottom of height grid, in kilometers.
    pub base_radius_km: f64,

    /// Sampling period, duration between two maps.
    pub sampling_period: Duration,

    /// Map [Grid] definition.
    pub grid: Grid,

    /// Minimum elevation angle filter used, in degrees.
    pub elevation_cutoff: f64,

    /// Default exponent, scaling map values: `value * 10^exponent`.
    /// Maps may declare their own exponent.
    pub exponent: i8,

    /// Comments found in the header section
    pub comments: Vec<String>,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            exponent: DEFAULT_EXPONENT,
            number_of_maps: 0,
            map_dimension: 2,
            mapf: Default::default(),
            comments: Default::default(),
            description: Default::default(),
            observables: Default::default(),
            num_stations: Default::default(),
            num_satellites: Default::default(),
            elevation_cutoff: 0.0,
            // mean Earth radius [km]
            base_radius_km: 6371.0,
            grid: Grid::default(),
            epoch_of_last_map: Epoch::default(),
            epoch_of_first_map: Epoch::default(),
            sampling_period: Duration::from_hours(1.0),
            reference_system: ReferenceSystem::default(),
            version: Version::new(1, 0),
            program: Default::default(),
            run_by: Default::default(),
            date: Default::default(),
            license: Default::default(),
            doi: Default::default(),
        }
    }
}

fn optional_text(field: &str) -> Option<String> {
    let field = field.trim();
    if field.is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}

fn missing(label: &str) -> ParsingError {
    ParsingError::MalformedHeader(format!("missing {}", label))
}

impl Header {
    /// Iterates over all map [Epoch]s announced by this [Header],
    /// from first to last map (both included).
    pub fn map_epochs(&self) -> impl Iterator<Item = Epoch> + '_ {
        let mut next = Some(self.epoch_of_first_map);
        std::iter::from_fn(move || {
            let epoch = next.filter(|t| *t <= self.epoch_of_last_map)?;
            next = if self.sampling_period > Duration::ZERO {
                Some(epoch + self.sampling_period)
            } else {
                None
            };
            Some(epoch)
        })
    }

    /// Parses [Header] until `END OF HEADER` (included).
    pub(crate) fn parse<R: BufRead + Seek>(
        reader: &mut LineReader<R>,
    ) -> Result<Self, ParsingError> {
        if !reader.advance()? {
            return Err(ParsingError::MalformedHeader("empty file".to_string()));
        }

        let line = reader.line();

        if line.label() != "IONEX VERSION / TYPE" {
            return Err(missing("IONEX VERSION / TYPE"));
        }

        let version_str = line.field(VERSION).trim();
        let version = Version::from_str(version_str)?;

        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ParsingError::UnsupportedVersion(version_str.to_string()));
        }

        if line.field(FILE_TYPE) != "I" {
            return Err(ParsingError::MalformedHeader(format!(
                "invalid file type \"{}\"",
                line.field(FILE_TYPE)
            )));
        }

        let mut header = Self {
            version,
            reference_system: ReferenceSystem::from_str(line.field(SYSTEM))?,
            ..Default::default()
        };

        let mut first_epoch = None;
        let mut last_epoch = None;
        let mut number_of_maps = None;
        let mut interval = None;
        let mut latitude = None;
        let mut longitude = None;
        let mut altitude = None;
        let mut aux_data = false;

        for _ in 0..MAX_HEADER_LINES {
            if !reader.advance()? {
                break;
            }

            let line = reader.line();
            let label = line.label();

            if aux_data {
                // AUX DATA blocks (differential code biases..) are not interpreted
                aux_data = !label.starts_with("END OF AUX DATA");
                continue;
            }

            match label {
                "END OF HEADER" => {
                    header.epoch_of_first_map =
                        first_epoch.ok_or_else(|| missing("EPOCH OF FIRST MAP"))?;
                    header.epoch_of_last_map =
                        last_epoch.ok_or_else(|| missing("EPOCH OF LAST MAP"))?;
                    header.number_of_maps =
                        number_of_maps.ok_or_else(|| missing("# OF MAPS IN FILE"))?;

                    header.grid = Grid {
                        latitude: latitude.ok_or_else(|| missing("LAT1 / LAT2 / DLAT"))?,
                        longitude: longitude.ok_or_else(|| missing("LON1 / LON2 / DLON"))?,
                        altitude: altitude.ok_or_else(|| missing("HGT1 / HGT2 / DHGT"))?,
                    };

                    header.sampling_period = match interval {
                        Some(interval) => interval,
                        None => header.derived_interval(),
                    };

                    header.validate()?;

                    #[cfg(feature = "log")]
                    debug!(
                        "IONEX V{} ({}): {} maps from {} to {}",
                        header.version,
                        header.reference_system,
                        header.number_of_maps,
                        header.epoch_of_first_map,
                        header.epoch_of_last_map
                    );

                    return Ok(header);
                },
                "COMMENT" => header.comments.push(line.content().trim_end().to_string()),
                "DESCRIPTION" => header
                    .description
                    .push(line.content().trim_end().to_string()),
                "PGM / RUN BY / DATE" => {
                    header.program = optional_text(line.field(PROGRAM));
                    header.run_by = optional_text(line.field(RUN_BY));
                    header.date = optional_text(line.field(DATE));
                },
                "LICENSE OF USE" => header.license = optional_text(line.content()),
                "DOI" => header.doi = optional_text(line.content()),
                "EPOCH OF FIRST MAP" => first_epoch = Some(parse_epoch(&line)?),
                "EPOCH OF LAST MAP" => last_epoch = Some(parse_epoch(&line)?),
                "INTERVAL" => {
                    let seconds = line.parse::<u32>(INTEGER, "interval")?;
                    interval = Some(Duration::from_seconds(seconds as f64));
                },
                "# OF MAPS IN FILE" => {
                    number_of_maps = Some(line.parse::<u32>(INTEGER, "number of maps")?)
                },
                "MAPPING FUNCTION" => {
                    header.mapf = MappingFunction::from_str(line.field(MAPPING_FUNCTION))?
                },
                "ELEVATION CUTOFF" => {
                    header.elevation_cutoff = line.parse(FLOAT, "elevation cutoff")?
                },
                "OBSERVABLES USED" => header.observables = optional_text(line.content()),
                "# OF STATIONS" => {
                    header.num_stations = line.parse_optional(INTEGER, "number of stations")?
                },
                "# OF SATELLITES" => {
                    header.num_satellites =
                        line.parse_optional(INTEGER, "number of satellites")?
                },
                "BASE RADIUS" => header.base_radius_km = line.parse(FLOAT, "base radius")?,
                "MAP DIMENSION" => header.map_dimension = line.parse(INTEGER, "map dimension")?,
                "HGT1 / HGT2 / DHGT" => altitude = Some(parse_linspace(&line)?),
                "LAT1 / LAT2 / DLAT" => latitude = Some(parse_linspace(&line)?),
                "LON1 / LON2 / DLON" => longitude = Some(parse_linspace(&line)?),
                "EXPONENT" => header.exponent = line.parse(INTEGER, "exponent")?,
                _ if label.starts_with("START OF AUX DATA") => aux_data = true,
                _ => {
                    #[cfg(feature = "log")]
                    warn!("line {}: ignored header record \"{}\"", line.number(), label);
                },
            }
        }

        Err(missing("END OF HEADER"))
    }

    /// Map interval deduced from the first and last map, when INTERVAL is omitted.
    fn derived_interval(&self) -> Duration {
        if self.number_of_maps > 1 {
            (self.epoch_of_last_map - self.epoch_of_first_map) / (self.number_of_maps - 1) as f64
        } else {
            Duration::ZERO
        }
    }

    fn validate(&self) -> Result<(), ParsingError> {
        if self.epoch_of_last_map < self.epoch_of_first_map {
            return Err(ParsingError::MalformedHeader(
                "last map precedes first map".to_string(),
            ));
        }

        self.grid.map_grid().map_err(|e| {
            ParsingError::MalformedHeader(format!("invalid map grid: {}", e))
        })?;

        if !self.grid.is_2d_grid() {
            self.grid.altitude_axis().map_err(|e| {
                ParsingError::MalformedHeader(format!("invalid altitude grid: {}", e))
            })?;
        }

        Ok(())
    }

    /// Number of rows (latitude x altitude layers) of one map.
    pub(crate) fn rows_per_map(&self) -> usize {
        let rows = self.grid.latitude.length().unwrap_or(0);
        let layers = if self.grid.is_2d_grid() {
            1
        } else {
            self.grid.altitude.length().unwrap_or(1)
        };
        rows * layers
    }

    /// Copies [Self], returning with an updated number of maps.
    pub fn with_number_of_maps(&self, number: u32) -> Self {
        let mut s = self.clone();
        s.number_of_maps = number;
        s
    }

    /// Copies [Self], returning with an updated [Grid].
    pub fn with_grid(&self, grid: Grid) -> Self {
        let mut s = self.clone();
        s.grid = grid;
        s
    }

    /// Copies [Self], returning with an updated latitude [Linspace].
    pub fn with_latitude_space(&self, linspace: Linspace) -> Self {
        self.with_grid(self.grid.with_latitude_space(linspace))
    }
}
