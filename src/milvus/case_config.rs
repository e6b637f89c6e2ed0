//! Per-family index configs and the two payloads they render.
//!
//! Each family is a plain struct embedding [`IndexConfigBase`]. The structs
//! share the [`CaseConfig`] trait and are gathered into the closed
//! [`MilvusIndexConfig`] enum, which is what the registry hands out.

use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::Result;
use crate::params::CaseParams;
use crate::types::{BuildAlgo, IndexType, MetricType};

/// Payload for index creation: `{metric_type, index_type, params}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexParam {
    pub metric_type: &'static str,
    pub index_type: IndexType,
    pub params: Map<String, Value>,
}

impl IndexParam {
    pub fn to_json(&self) -> Value {
        json!({
            "metric_type": self.metric_type,
            "index_type": self.index_type.as_str(),
            "params": self.params,
        })
    }
}

/// Payload for a search request: `{metric_type, params}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchParam {
    pub metric_type: &'static str,
    pub params: Map<String, Value>,
}

impl SearchParam {
    pub fn to_json(&self) -> Value {
        json!({
            "metric_type": self.metric_type,
            "params": self.params,
        })
    }
}

/// Fields shared by every family.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IndexConfigBase {
    pub metric_type: Option<MetricType>,
}

impl IndexConfigBase {
    pub fn new(metric_type: Option<MetricType>) -> Self {
        Self { metric_type }
    }

    fn from_params(params: &CaseParams) -> Result<Self> {
        Ok(Self {
            metric_type: params.metric_type()?,
        })
    }

    /// Metric string sent to Milvus, or `""` when none is configured.
    ///
    /// GPU indexes have no native cosine distance; vectors are normalized
    /// upstream and L2 is sent instead.
    pub fn parse_metric(&self, index: IndexType) -> &'static str {
        match self.metric_type {
            None => "",
            Some(MetricType::Cosine) if index.is_gpu() => {
                debug!(index = %index, "cosine metric mapped to L2 for gpu index");
                MetricType::L2.as_str()
            }
            Some(metric) => metric.as_str(),
        }
    }
}

/// Behaviour shared by every family config.
pub trait CaseConfig: Sized {
    const INDEX: IndexType;

    /// Build from resolved parameters, applying documented defaults.
    fn from_params(params: &CaseParams) -> Result<Self>;

    fn base(&self) -> &IndexConfigBase;

    /// Knobs consumed when the index is built.
    fn build_params(&self) -> Map<String, Value>;

    /// Knobs consumed when searching the built index.
    fn search_params(&self) -> Map<String, Value>;

    fn is_gpu_index(&self) -> bool {
        Self::INDEX.is_gpu()
    }

    fn parse_metric(&self) -> &'static str {
        self.base().parse_metric(Self::INDEX)
    }

    fn index_param(&self) -> IndexParam {
        IndexParam {
            metric_type: self.parse_metric(),
            index_type: Self::INDEX,
            params: self.build_params(),
        }
    }

    fn search_param(&self) -> SearchParam {
        SearchParam {
            metric_type: self.parse_metric(),
            params: self.search_params(),
        }
    }
}

fn param_map<const N: usize>(entries: [(&str, Value); N]) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

// ─── Managed / exact ───

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AutoIndexConfig {
    pub base: IndexConfigBase,
}

impl CaseConfig for AutoIndexConfig {
    const INDEX: IndexType = IndexType::AutoIndex;

    fn from_params(params: &CaseParams) -> Result<Self> {
        Ok(Self {
            base: IndexConfigBase::from_params(params)?,
        })
    }

    fn base(&self) -> &IndexConfigBase {
        &self.base
    }

    fn build_params(&self) -> Map<String, Value> {
        Map::new()
    }

    fn search_params(&self) -> Map<String, Value> {
        Map::new()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatConfig {
    pub base: IndexConfigBase,
}

impl CaseConfig for FlatConfig {
    const INDEX: IndexType = IndexType::Flat;

    fn from_params(params: &CaseParams) -> Result<Self> {
        Ok(Self {
            base: IndexConfigBase::from_params(params)?,
        })
    }

    fn base(&self) -> &IndexConfigBase {
        &self.base
    }

    fn build_params(&self) -> Map<String, Value> {
        Map::new()
    }

    fn search_params(&self) -> Map<String, Value> {
        Map::new()
    }
}

// ─── Graph ───

#[derive(Debug, Clone, PartialEq)]
pub struct HnswConfig {
    pub base: IndexConfigBase,
    /// Max out-degree per node.
    pub m: u32,
    pub ef_construction: u32,
    /// Search candidate width; `None` lets Milvus pick.
    pub ef: Option<u32>,
}

impl CaseConfig for HnswConfig {
    const INDEX: IndexType = IndexType::Hnsw;

    fn from_params(params: &CaseParams) -> Result<Self> {
        Ok(Self {
            base: IndexConfigBase::from_params(params)?,
            m: params.required_u32(Self::INDEX, "m")?,
            ef_construction: params.required_u32(Self::INDEX, "ef_construction")?,
            ef: params.optional_u32("ef_search")?,
        })
    }

    fn base(&self) -> &IndexConfigBase {
        &self.base
    }

    fn build_params(&self) -> Map<String, Value> {
        param_map([
            ("M", self.m.into()),
            ("efConstruction", self.ef_construction.into()),
        ])
    }

    fn search_params(&self) -> Map<String, Value> {
        param_map([("ef", self.ef.into())])
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiskAnnConfig {
    pub base: IndexConfigBase,
    pub search_list: Option<u32>,
}

impl CaseConfig for DiskAnnConfig {
    const INDEX: IndexType = IndexType::DiskAnn;

    fn from_params(params: &CaseParams) -> Result<Self> {
        Ok(Self {
            base: IndexConfigBase::from_params(params)?,
            search_list: params.optional_u32("search_list")?,
        })
    }

    fn base(&self) -> &IndexConfigBase {
        &self.base
    }

    fn build_params(&self) -> Map<String, Value> {
        Map::new()
    }

    fn search_params(&self) -> Map<String, Value> {
        param_map([("search_list", self.search_list.into())])
    }
}

// ─── Inverted file ───

#[derive(Debug, Clone, PartialEq)]
pub struct IvfFlatConfig {
    pub base: IndexConfigBase,
    pub nlist: u32,
    pub nprobe: Option<u32>,
}

impl CaseConfig for IvfFlatConfig {
    const INDEX: IndexType = IndexType::IvfFlat;

    fn from_params(params: &CaseParams) -> Result<Self> {
        Ok(Self {
            base: IndexConfigBase::from_params(params)?,
            nlist: params.required_u32(Self::INDEX, "nlist")?,
            nprobe: params.optional_u32("nprobe")?,
        })
    }

    fn base(&self) -> &IndexConfigBase {
        &self.base
    }

    fn build_params(&self) -> Map<String, Value> {
        param_map([("nlist", self.nlist.into())])
    }

    fn search_params(&self) -> Map<String, Value> {
        param_map([("nprobe", self.nprobe.into())])
    }
}

/// IVF with 8-bit scalar quantization. Same knobs as [`IvfFlatConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct IvfSq8Config {
    pub base: IndexConfigBase,
    pub nlist: u32,
    pub nprobe: Option<u32>,
}

impl CaseConfig for IvfSq8Config {
    const INDEX: IndexType = IndexType::IvfSq8;

    fn from_params(params: &CaseParams) -> Result<Self> {
        Ok(Self {
            base: IndexConfigBase::from_params(params)?,
            nlist: params.required_u32(Self::INDEX, "nlist")?,
            nprobe: params.optional_u32("nprobe")?,
        })
    }

    fn base(&self) -> &IndexConfigBase {
        &self.base
    }

    fn build_params(&self) -> Map<String, Value> {
        param_map([("nlist", self.nlist.into())])
    }

    fn search_params(&self) -> Map<String, Value> {
        param_map([("nprobe", self.nprobe.into())])
    }
}

// ─── GPU ───

#[derive(Debug, Clone, PartialEq)]
pub struct GpuIvfFlatConfig {
    pub base: IndexConfigBase,
    pub nlist: u32,
    pub nprobe: u32,
    /// Passed through verbatim, usually `"true"` or `"false"`.
    pub cache_dataset_on_device: String,
    pub refine_ratio: Option<f64>,
}

impl GpuIvfFlatConfig {
    pub const DEFAULT_NLIST: u32 = 1024;
    pub const DEFAULT_NPROBE: u32 = 64;

    pub fn new(cache_dataset_on_device: impl Into<String>) -> Self {
        Self {
            base: IndexConfigBase::default(),
            nlist: Self::DEFAULT_NLIST,
            nprobe: Self::DEFAULT_NPROBE,
            cache_dataset_on_device: cache_dataset_on_device.into(),
            refine_ratio: None,
        }
    }
}

impl CaseConfig for GpuIvfFlatConfig {
    const INDEX: IndexType = IndexType::GpuIvfFlat;

    fn from_params(params: &CaseParams) -> Result<Self> {
        Ok(Self {
            base: IndexConfigBase::from_params(params)?,
            nlist: params.u32_or("nlist", Self::DEFAULT_NLIST)?,
            nprobe: params.u32_or("nprobe", Self::DEFAULT_NPROBE)?,
            cache_dataset_on_device: params
                .required_str(Self::INDEX, "cache_dataset_on_device")?,
            refine_ratio: params.optional_f64("refine_ratio")?,
        })
    }

    fn base(&self) -> &IndexConfigBase {
        &self.base
    }

    fn build_params(&self) -> Map<String, Value> {
        param_map([
            ("nlist", self.nlist.into()),
            (
                "cache_dataset_on_device",
                self.cache_dataset_on_device.clone().into(),
            ),
        ])
    }

    fn search_params(&self) -> Map<String, Value> {
        param_map([
            ("nprobe", self.nprobe.into()),
            ("refine_ratio", self.refine_ratio.into()),
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GpuIvfPqConfig {
    pub base: IndexConfigBase,
    pub nlist: u32,
    /// Sub-quantizer count; 0 lets Milvus derive it from the dimension.
    pub m: u32,
    pub nbits: u32,
    pub nprobe: u32,
    pub cache_dataset_on_device: String,
    pub refine_ratio: Option<f64>,
}

impl GpuIvfPqConfig {
    pub const DEFAULT_NLIST: u32 = 1024;
    pub const DEFAULT_M: u32 = 0;
    pub const DEFAULT_NBITS: u32 = 8;
    pub const DEFAULT_NPROBE: u32 = 32;

    pub fn new(cache_dataset_on_device: impl Into<String>) -> Self {
        Self {
            base: IndexConfigBase::default(),
            nlist: Self::DEFAULT_NLIST,
            m: Self::DEFAULT_M,
            nbits: Self::DEFAULT_NBITS,
            nprobe: Self::DEFAULT_NPROBE,
            cache_dataset_on_device: cache_dataset_on_device.into(),
            refine_ratio: None,
        }
    }
}

impl CaseConfig for GpuIvfPqConfig {
    const INDEX: IndexType = IndexType::GpuIvfPq;

    fn from_params(params: &CaseParams) -> Result<Self> {
        Ok(Self {
            base: IndexConfigBase::from_params(params)?,
            nlist: params.u32_or("nlist", Self::DEFAULT_NLIST)?,
            m: params.u32_or("m", Self::DEFAULT_M)?,
            nbits: params.u32_or("nbits", Self::DEFAULT_NBITS)?,
            nprobe: params.u32_or("nprobe", Self::DEFAULT_NPROBE)?,
            cache_dataset_on_device: params
                .required_str(Self::INDEX, "cache_dataset_on_device")?,
            refine_ratio: params.optional_f64("refine_ratio")?,
        })
    }

    fn base(&self) -> &IndexConfigBase {
        &self.base
    }

    fn build_params(&self) -> Map<String, Value> {
        param_map([
            ("nlist", self.nlist.into()),
            ("m", self.m.into()),
            ("nbits", self.nbits.into()),
            (
                "cache_dataset_on_device",
                self.cache_dataset_on_device.clone().into(),
            ),
        ])
    }

    fn search_params(&self) -> Map<String, Value> {
        param_map([
            ("nprobe", self.nprobe.into()),
            ("refine_ratio", self.refine_ratio.into()),
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GpuCagraConfig {
    pub base: IndexConfigBase,
    pub intermediate_graph_degree: u32,
    pub graph_degree: u32,
    pub build_algo: BuildAlgo,
    pub cache_dataset_on_device: String,
    pub team_size: u32,
    pub search_width: u32,
    pub itopk_size: u32,
    pub min_iterations: u32,
    pub max_iterations: u32,
    pub refine_ratio: Option<f64>,
}

impl GpuCagraConfig {
    pub const DEFAULT_INTERMEDIATE_GRAPH_DEGREE: u32 = 64;
    pub const DEFAULT_GRAPH_DEGREE: u32 = 32;
    pub const DEFAULT_ITOPK_SIZE: u32 = 128;
    pub const DEFAULT_TEAM_SIZE: u32 = 0;
    pub const DEFAULT_SEARCH_WIDTH: u32 = 4;
    pub const DEFAULT_MIN_ITERATIONS: u32 = 0;
    pub const DEFAULT_MAX_ITERATIONS: u32 = 0;

    pub fn new(cache_dataset_on_device: impl Into<String>) -> Self {
        Self {
            base: IndexConfigBase::default(),
            intermediate_graph_degree: Self::DEFAULT_INTERMEDIATE_GRAPH_DEGREE,
            graph_degree: Self::DEFAULT_GRAPH_DEGREE,
            build_algo: BuildAlgo::default(),
            cache_dataset_on_device: cache_dataset_on_device.into(),
            team_size: Self::DEFAULT_TEAM_SIZE,
            search_width: Self::DEFAULT_SEARCH_WIDTH,
            itopk_size: Self::DEFAULT_ITOPK_SIZE,
            min_iterations: Self::DEFAULT_MIN_ITERATIONS,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            refine_ratio: None,
        }
    }
}

impl CaseConfig for GpuCagraConfig {
    const INDEX: IndexType = IndexType::GpuCagra;

    fn from_params(params: &CaseParams) -> Result<Self> {
        Ok(Self {
            base: IndexConfigBase::from_params(params)?,
            intermediate_graph_degree: params.u32_or(
                "intermediate_graph_degree",
                Self::DEFAULT_INTERMEDIATE_GRAPH_DEGREE,
            )?,
            graph_degree: params.u32_or("graph_degree", Self::DEFAULT_GRAPH_DEGREE)?,
            build_algo: params.parse_or("build_algo", BuildAlgo::default())?,
            cache_dataset_on_device: params
                .required_str(Self::INDEX, "cache_dataset_on_device")?,
            team_size: params.u32_or("team_size", Self::DEFAULT_TEAM_SIZE)?,
            search_width: params.u32_or("search_width", Self::DEFAULT_SEARCH_WIDTH)?,
            itopk_size: params.u32_or("itopk_size", Self::DEFAULT_ITOPK_SIZE)?,
            min_iterations: params.u32_or("min_iterations", Self::DEFAULT_MIN_ITERATIONS)?,
            max_iterations: params.u32_or("max_iterations", Self::DEFAULT_MAX_ITERATIONS)?,
            refine_ratio: params.optional_f64("refine_ratio")?,
        })
    }

    fn base(&self) -> &IndexConfigBase {
        &self.base
    }

    fn build_params(&self) -> Map<String, Value> {
        param_map([
            (
                "intermediate_graph_degree",
                self.intermediate_graph_degree.into(),
            ),
            ("graph_degree", self.graph_degree.into()),
            ("build_algo", self.build_algo.as_str().into()),
            (
                "cache_dataset_on_device",
                self.cache_dataset_on_device.clone().into(),
            ),
        ])
    }

    fn search_params(&self) -> Map<String, Value> {
        param_map([
            ("team_size", self.team_size.into()),
            ("search_width", self.search_width.into()),
            ("itopk_size", self.itopk_size.into()),
            ("min_iterations", self.min_iterations.into()),
            ("max_iterations", self.max_iterations.into()),
            ("refine_ratio", self.refine_ratio.into()),
        ])
    }
}

/// Exact search on the GPU. Probing is meaningless, so `nprobe` is pinned to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct GpuBruteForceConfig {
    pub base: IndexConfigBase,
    /// Top-k for search.
    pub limit: u32,
}

impl GpuBruteForceConfig {
    pub const DEFAULT_LIMIT: u32 = 10;
    pub const NPROBE: u32 = 1;
}

impl Default for GpuBruteForceConfig {
    fn default() -> Self {
        Self {
            base: IndexConfigBase::default(),
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

impl CaseConfig for GpuBruteForceConfig {
    const INDEX: IndexType = IndexType::GpuBruteForce;

    fn from_params(params: &CaseParams) -> Result<Self> {
        Ok(Self {
            base: IndexConfigBase::from_params(params)?,
            limit: params.u32_or("limit", Self::DEFAULT_LIMIT)?,
        })
    }

    fn base(&self) -> &IndexConfigBase {
        &self.base
    }

    fn build_params(&self) -> Map<String, Value> {
        Map::new()
    }

    fn search_params(&self) -> Map<String, Value> {
        param_map([
            ("nprobe", Self::NPROBE.into()),
            ("limit", self.limit.into()),
        ])
    }
}

// ─── Closed set ───

/// The index config active for one run.
#[derive(Debug, Clone, PartialEq)]
pub enum MilvusIndexConfig {
    AutoIndex(AutoIndexConfig),
    Flat(FlatConfig),
    Hnsw(HnswConfig),
    DiskAnn(DiskAnnConfig),
    IvfFlat(IvfFlatConfig),
    IvfSq8(IvfSq8Config),
    GpuIvfFlat(GpuIvfFlatConfig),
    GpuIvfPq(GpuIvfPqConfig),
    GpuCagra(GpuCagraConfig),
    GpuBruteForce(GpuBruteForceConfig),
}

/// Run `$body` with `$cfg` bound to the inner family config.
macro_rules! with_variant {
    ($self:expr, $cfg:ident => $body:expr) => {
        match $self {
            MilvusIndexConfig::AutoIndex($cfg) => $body,
            MilvusIndexConfig::Flat($cfg) => $body,
            MilvusIndexConfig::Hnsw($cfg) => $body,
            MilvusIndexConfig::DiskAnn($cfg) => $body,
            MilvusIndexConfig::IvfFlat($cfg) => $body,
            MilvusIndexConfig::IvfSq8($cfg) => $body,
            MilvusIndexConfig::GpuIvfFlat($cfg) => $body,
            MilvusIndexConfig::GpuIvfPq($cfg) => $body,
            MilvusIndexConfig::GpuCagra($cfg) => $body,
            MilvusIndexConfig::GpuBruteForce($cfg) => $body,
        }
    };
}

impl MilvusIndexConfig {
    pub fn index_type(&self) -> IndexType {
        match self {
            MilvusIndexConfig::AutoIndex(_) => AutoIndexConfig::INDEX,
            MilvusIndexConfig::Flat(_) => FlatConfig::INDEX,
            MilvusIndexConfig::Hnsw(_) => HnswConfig::INDEX,
            MilvusIndexConfig::DiskAnn(_) => DiskAnnConfig::INDEX,
            MilvusIndexConfig::IvfFlat(_) => IvfFlatConfig::INDEX,
            MilvusIndexConfig::IvfSq8(_) => IvfSq8Config::INDEX,
            MilvusIndexConfig::GpuIvfFlat(_) => GpuIvfFlatConfig::INDEX,
            MilvusIndexConfig::GpuIvfPq(_) => GpuIvfPqConfig::INDEX,
            MilvusIndexConfig::GpuCagra(_) => GpuCagraConfig::INDEX,
            MilvusIndexConfig::GpuBruteForce(_) => GpuBruteForceConfig::INDEX,
        }
    }

    pub fn metric_type(&self) -> Option<MetricType> {
        with_variant!(self, cfg => cfg.base().metric_type)
    }

    pub fn is_gpu_index(&self) -> bool {
        with_variant!(self, cfg => cfg.is_gpu_index())
    }

    pub fn parse_metric(&self) -> &'static str {
        with_variant!(self, cfg => cfg.parse_metric())
    }

    pub fn index_param(&self) -> IndexParam {
        with_variant!(self, cfg => cfg.index_param())
    }

    pub fn search_param(&self) -> SearchParam {
        with_variant!(self, cfg => cfg.search_param())
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for MilvusIndexConfig {
                fn from(cfg: $ty) -> Self {
                    MilvusIndexConfig::$variant(cfg)
                }
            }
        )*
    };
}

impl_from_variant! {
    AutoIndex => AutoIndexConfig,
    Flat => FlatConfig,
    Hnsw => HnswConfig,
    DiskAnn => DiskAnnConfig,
    IvfFlat => IvfFlatConfig,
    IvfSq8 => IvfSq8Config,
    GpuIvfFlat => GpuIvfFlatConfig,
    GpuIvfPq => GpuIvfPqConfig,
    GpuCagra => GpuCagraConfig,
    GpuBruteForce => GpuBruteForceConfig,
}
