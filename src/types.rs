use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BenchError;

/// Index family requested for a benchmark run.
///
/// Serialized with the tag the database expects on the wire. A few families
/// belong to other backends of the harness and are not registered for
/// Milvus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IndexType {
    #[serde(rename = "AUTOINDEX")]
    AutoIndex,
    #[serde(rename = "Flat")]
    Flat,
    #[serde(rename = "HNSW")]
    Hnsw,
    #[serde(rename = "DISKANN")]
    DiskAnn,
    #[serde(rename = "IVF_FLAT")]
    IvfFlat,
    #[serde(rename = "IVF_SQ8")]
    IvfSq8,
    #[serde(rename = "GPU_IVF_FLAT")]
    GpuIvfFlat,
    #[serde(rename = "GPU_IVF_PQ")]
    GpuIvfPq,
    #[serde(rename = "GPU_CAGRA")]
    GpuCagra,
    #[serde(rename = "GPU_BRUTE_FORCE")]
    GpuBruteForce,
    #[serde(rename = "streaming_diskann")]
    StreamingDiskAnn,
    #[serde(rename = "hnsw")]
    EsHnsw,
    #[serde(rename = "ivfflat")]
    EsIvfFlat,
}

impl IndexType {
    pub const ALL: [IndexType; 13] = [
        IndexType::AutoIndex,
        IndexType::Flat,
        IndexType::Hnsw,
        IndexType::DiskAnn,
        IndexType::IvfFlat,
        IndexType::IvfSq8,
        IndexType::GpuIvfFlat,
        IndexType::GpuIvfPq,
        IndexType::GpuCagra,
        IndexType::GpuBruteForce,
        IndexType::StreamingDiskAnn,
        IndexType::EsHnsw,
        IndexType::EsIvfFlat,
    ];

    /// Tag sent to the database as `index_type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexType::AutoIndex => "AUTOINDEX",
            IndexType::Flat => "Flat",
            IndexType::Hnsw => "HNSW",
            IndexType::DiskAnn => "DISKANN",
            IndexType::IvfFlat => "IVF_FLAT",
            IndexType::IvfSq8 => "IVF_SQ8",
            IndexType::GpuIvfFlat => "GPU_IVF_FLAT",
            IndexType::GpuIvfPq => "GPU_IVF_PQ",
            IndexType::GpuCagra => "GPU_CAGRA",
            IndexType::GpuBruteForce => "GPU_BRUTE_FORCE",
            IndexType::StreamingDiskAnn => "streaming_diskann",
            IndexType::EsHnsw => "hnsw",
            IndexType::EsIvfFlat => "ivfflat",
        }
    }

    /// Upper-case name used on the command line and in config sections.
    pub fn name(&self) -> &'static str {
        match self {
            IndexType::AutoIndex => "AUTOINDEX",
            IndexType::Flat => "FLAT",
            IndexType::Hnsw => "HNSW",
            IndexType::DiskAnn => "DISKANN",
            IndexType::IvfFlat => "IVF_FLAT",
            IndexType::IvfSq8 => "IVF_SQ8",
            IndexType::GpuIvfFlat => "GPU_IVF_FLAT",
            IndexType::GpuIvfPq => "GPU_IVF_PQ",
            IndexType::GpuCagra => "GPU_CAGRA",
            IndexType::GpuBruteForce => "GPU_BRUTE_FORCE",
            IndexType::StreamingDiskAnn => "STREAMING_DISKANN",
            IndexType::EsHnsw => "ES_HNSW",
            IndexType::EsIvfFlat => "ES_IVFFLAT",
        }
    }

    pub fn is_gpu(&self) -> bool {
        matches!(
            self,
            IndexType::GpuIvfFlat
                | IndexType::GpuIvfPq
                | IndexType::GpuCagra
                | IndexType::GpuBruteForce
        )
    }
}

impl std::fmt::Display for IndexType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexType {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        IndexType::ALL
            .into_iter()
            .find(|index| index.name() == upper)
            .ok_or_else(|| BenchError::invalid("index_type", format!("unknown index type '{s}'")))
    }
}

/// Distance metric for vector comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MetricType {
    L2,
    Ip,
    Cosine,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::L2 => "L2",
            MetricType::Ip => "IP",
            MetricType::Cosine => "COSINE",
        }
    }
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricType {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L2" => Ok(MetricType::L2),
            "IP" => Ok(MetricType::Ip),
            "COSINE" => Ok(MetricType::Cosine),
            _ => Err(BenchError::invalid(
                "metric_type",
                format!("unknown metric type '{s}'"),
            )),
        }
    }
}

/// Graph construction algorithm for GPU CAGRA.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildAlgo {
    #[default]
    IvfPq,
    NnDescent,
}

impl BuildAlgo {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildAlgo::IvfPq => "IVF_PQ",
            BuildAlgo::NnDescent => "NN_DESCENT",
        }
    }
}

impl std::fmt::Display for BuildAlgo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildAlgo {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IVF_PQ" => Ok(BuildAlgo::IvfPq),
            "NN_DESCENT" => Ok(BuildAlgo::NnDescent),
            _ => Err(BenchError::invalid(
                "build_algo",
                format!("unknown build algorithm '{s}', expected IVF_PQ or NN_DESCENT"),
            )),
        }
    }
}
