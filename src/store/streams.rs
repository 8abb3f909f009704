use crate::error::{Error, Result};
use crate::types::ids::StreamId;
use crate::types::points::Points;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamStatus {
    Live,
    Ended,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stream {
    pub stream_id: StreamId,
    pub title: String,
    pub status: StreamStatus,
    pub points_per_minute: Points,
    pub viewer_count: u64,
}

impl Stream {
    pub fn live(title: &str, points_per_minute: Points) -> Self {
        Stream {
            stream_id: StreamId::new(),
            title: title.to_string(),
            status: StreamStatus::Live,
            points_per_minute,
            viewer_count: 0,
        }
    }

    pub fn is_live(&self) -> bool {
        self.status == StreamStatus::Live
    }
}

pub struct StreamRegistry {
    streams: HashMap<StreamId, Stream>,
}

impl StreamRegistry {
    pub fn new() -> Self {
        StreamRegistry {
            streams: HashMap::new(),
        }
    }

    pub fn upsert(&mut self, stream: Stream) {
        self.streams.insert(stream.stream_id, stream);
    }

    pub fn get(&self, stream_id: StreamId) -> Result<&Stream> {
        self.streams
            .get(&stream_id)
            .ok_or(Error::StreamNotFound(stream_id))
    }

    pub fn set_status(&mut self, stream_id: StreamId, status: StreamStatus) -> Result<()> {
        let stream = self
            .streams
            .get_mut(&stream_id)
            .ok_or(Error::StreamNotFound(stream_id))?;
        stream.status = status;
        Ok(())
    }

    pub fn viewer_joined(&mut self, stream_id: StreamId) -> Result<u64> {
        let stream = self
            .streams
            .get_mut(&stream_id)
            .ok_or(Error::StreamNotFound(stream_id))?;
        stream.viewer_count += 1;
        Ok(stream.viewer_count)
    }

    pub fn viewer_left(&mut self, stream_id: StreamId) -> Result<u64> {
        let stream = self
            .streams
            .get_mut(&stream_id)
            .ok_or(Error::StreamNotFound(stream_id))?;
        stream.viewer_count = stream.viewer_count.saturating_sub(1);
        Ok(stream.viewer_count)
    }
}
