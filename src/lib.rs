#![doc(
    html_logo_url = "https://raw.githubusercontent.com/nav-solutions/.github/master/logos/logo2.jpg"
)]
#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

/*
 * GRIDEX is part of the nav-solutions framework.
 *
 * Authors: Guillaume W. Bres <guillaume.bressaix@gmail.com> et al.
 * (cf. https://github.com/nav-solutions/gridex/graphs/contributors),
 * licensed under Mozilla Public license V2.
 *
 * Documentation: https://github.com/nav-solutions/gridex
 */

extern crate gnss_rs as gnss;

pub mod antex;
pub mod axis;
pub mod epoch;
pub mod error;
pub mod grid;
pub mod ionex;
pub mod linspace;
pub mod version;

mod line;

#[cfg(test)]
mod tests;

pub mod prelude {
    // export
    pub use crate::{
        antex::{
            Antenna, AntennaMatch, AntennaPattern, AntexReader, Calibration, CalibrationMethod,
            FrequencyId, FrequencyPattern, Header as AntexHeader, PcvType,
        },
        axis::{Node, RangeMode, TickAxis},
        epoch::{Epoch, Microseconds, Milliseconds, Nanoseconds, Resolution, Seconds},
        error::{Error, ParsingError},
        grid::{Grid1D, Grid2D, Node2D, RowOrder},
        ionex::{
            Grid, Header as IonexHeader, IonexReader, MapKind, MappingFunction, ReferenceSystem,
            TecMap, TecSeries,
        },
        linspace::Linspace,
        version::Version,
    };

    // pub re-export
    pub use geo::Point;
    pub use gnss::prelude::Constellation;
    pub use hifitime::Duration;
}
