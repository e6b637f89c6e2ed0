use serde_json::Value;
use vdbbench::params::CaseParams;
use vdbbench::types::IndexType;

pub const GPU_FAMILIES: [IndexType; 4] = [
    IndexType::GpuIvfFlat,
    IndexType::GpuIvfPq,
    IndexType::GpuCagra,
    IndexType::GpuBruteForce,
];

pub const CPU_FAMILIES: [IndexType; 6] = [
    IndexType::AutoIndex,
    IndexType::Flat,
    IndexType::Hnsw,
    IndexType::DiskAnn,
    IndexType::IvfFlat,
    IndexType::IvfSq8,
];

/// GPU families that take the device-cache flag.
pub const DEVICE_CACHE_FAMILIES: [IndexType; 3] = [
    IndexType::GpuIvfFlat,
    IndexType::GpuIvfPq,
    IndexType::GpuCagra,
];

/// Build `CaseParams` from literal pairs.
pub fn case_params<const N: usize>(pairs: [(&str, Value); N]) -> CaseParams {
    let mut params = CaseParams::new();
    for (k, v) in pairs {
        params.set(k, v);
    }
    params
}

/// Parameters that satisfy every required knob of `index` and nothing more.
pub fn minimal_params(index: IndexType) -> CaseParams {
    match index {
        IndexType::Hnsw => case_params([
            ("m", Value::from(16)),
            ("ef_construction", Value::from(200)),
        ]),
        IndexType::IvfFlat | IndexType::IvfSq8 => case_params([("nlist", Value::from(128))]),
        IndexType::GpuIvfFlat | IndexType::GpuIvfPq | IndexType::GpuCagra => {
            case_params([("cache_dataset_on_device", Value::from("true"))])
        }
        _ => CaseParams::new(),
    }
}

/// `minimal_params` plus a metric.
pub fn with_metric(index: IndexType, metric: &str) -> CaseParams {
    let mut params = minimal_params(index);
    params.set("metric_type", metric);
    params
}
