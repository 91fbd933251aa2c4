//! Geospatial operations

use crate::convert;
use crate::deferred::Outcome;
use crate::driver::{invoke, Driver};
use crate::ops::SharedSession;
use redis_bridge_core::{BridgeResult, CommandDescriptor, CommandFrame, GeoPoint};

/// Operations on geospatial indexes
pub struct GeoOps<D: Driver> {
    session: SharedSession<D>,
}

impl<D: Driver> GeoOps<D> {
    pub(crate) fn new(session: SharedSession<D>) -> Self {
        Self { session }
    }

    /// Add positioned members, returning how many were new
    pub fn geo_add<I, M>(&self, key: impl Into<Vec<u8>>, members: I) -> BridgeResult<Outcome<i64>>
    where
        I: IntoIterator<Item = (GeoPoint, M)>,
        M: Into<Vec<u8>>,
    {
        let mut frame = CommandFrame::new("GEOADD").arg(key);
        for (point, member) in members {
            frame = frame
                .arg_float(point.longitude)
                .arg_float(point.latitude)
                .arg(member);
        }
        self.session.lock().run(
            CommandDescriptor::new("GEOADD"),
            Some(invoke(frame)),
            convert::integer,
        )
    }

    /// Positions of members, aligned with the request; unknown members are None
    pub fn geo_pos<I, M>(
        &self,
        key: impl Into<Vec<u8>>,
        members: I,
    ) -> BridgeResult<Outcome<Vec<Option<GeoPoint>>>>
    where
        I: IntoIterator<Item = M>,
        M: Into<Vec<u8>>,
    {
        let frame = CommandFrame::new("GEOPOS").arg(key).args(members);
        self.session.lock().run(
            CommandDescriptor::new("GEOPOS"),
            Some(invoke(frame)),
            convert::geo_points,
        )
    }

    /// Distance between two members in meters, if both exist
    pub fn geo_dist(
        &self,
        key: impl Into<Vec<u8>>,
        first: impl Into<Vec<u8>>,
        second: impl Into<Vec<u8>>,
    ) -> BridgeResult<Outcome<Option<f64>>> {
        let frame = CommandFrame::new("GEODIST")
            .arg(key)
            .arg(first)
            .arg(second)
            .arg("m");
        self.session.lock().run(
            CommandDescriptor::new("GEODIST"),
            Some(invoke(frame)),
            convert::optional_float,
        )
    }
}
