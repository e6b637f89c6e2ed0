use std::collections::HashMap;

use lazy_static::lazy_static;
use tracing::{debug, instrument};

use crate::error::{BenchError, Result};
use crate::params::CaseParams;
use crate::types::IndexType;

use super::case_config::{
    AutoIndexConfig, CaseConfig, DiskAnnConfig, FlatConfig, GpuBruteForceConfig, GpuCagraConfig,
    GpuIvfFlatConfig, GpuIvfPqConfig, HnswConfig, IvfFlatConfig, IvfSq8Config, MilvusIndexConfig,
};

/// Builds the config for one index family from resolved parameters.
pub type CaseConfigCtor = fn(&CaseParams) -> Result<MilvusIndexConfig>;

fn ctor<C>(params: &CaseParams) -> Result<MilvusIndexConfig>
where
    C: CaseConfig + Into<MilvusIndexConfig>,
{
    C::from_params(params).map(Into::into)
}

lazy_static! {
    static ref CASE_CONFIGS: HashMap<IndexType, CaseConfigCtor> = {
        let entries: [(IndexType, CaseConfigCtor); 10] = [
            (AutoIndexConfig::INDEX, ctor::<AutoIndexConfig>),
            (HnswConfig::INDEX, ctor::<HnswConfig>),
            (DiskAnnConfig::INDEX, ctor::<DiskAnnConfig>),
            (IvfFlatConfig::INDEX, ctor::<IvfFlatConfig>),
            (IvfSq8Config::INDEX, ctor::<IvfSq8Config>),
            (FlatConfig::INDEX, ctor::<FlatConfig>),
            (GpuIvfFlatConfig::INDEX, ctor::<GpuIvfFlatConfig>),
            (GpuIvfPqConfig::INDEX, ctor::<GpuIvfPqConfig>),
            (GpuCagraConfig::INDEX, ctor::<GpuCagraConfig>),
            (GpuBruteForceConfig::INDEX, ctor::<GpuBruteForceConfig>),
        ];
        entries.into_iter().collect()
    };
}

/// Constructor registered for `index`.
pub fn lookup(index: IndexType) -> Result<CaseConfigCtor> {
    CASE_CONFIGS
        .get(&index)
        .copied()
        .ok_or(BenchError::NotSupported { index })
}

pub fn is_registered(index: IndexType) -> bool {
    CASE_CONFIGS.contains_key(&index)
}

/// Registered families in declaration order.
pub fn registered_index_types() -> Vec<IndexType> {
    let mut types: Vec<IndexType> = CASE_CONFIGS.keys().copied().collect();
    types.sort();
    types
}

/// Look up `index` and build its config from `params`.
#[instrument(skip_all, fields(index = %index))]
pub fn build_case_config(index: IndexType, params: &CaseParams) -> Result<MilvusIndexConfig> {
    let config = lookup(index)?(params)?;
    debug!(
        metric_type = config.parse_metric(),
        gpu = config.is_gpu_index(),
        "case config built"
    );
    Ok(config)
}
