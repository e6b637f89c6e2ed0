mod common;

use common::assertions::{assert_invalid_field, assert_missing_field, assert_no_keys};
use common::params::{
    case_params, minimal_params, with_metric, CPU_FAMILIES, DEVICE_CACHE_FAMILIES, GPU_FAMILIES,
};

use proptest::prelude::*;
use serde_json::{json, Value};

use vdbbench::milvus::case_config::{
    CaseConfig, FlatConfig, GpuBruteForceConfig, GpuCagraConfig, GpuIvfFlatConfig,
    GpuIvfPqConfig, HnswConfig, IndexConfigBase,
};
use vdbbench::milvus::{build_case_config, MilvusIndexConfig};
use vdbbench::params::CaseParams;
use vdbbench::types::{BuildAlgo, IndexType, MetricType};

const BUILD_ONLY_KEYS: &[&str] = &[
    "nlist",
    "M",
    "efConstruction",
    "m",
    "nbits",
    "cache_dataset_on_device",
    "intermediate_graph_degree",
    "graph_degree",
    "build_algo",
];

const SEARCH_ONLY_KEYS: &[&str] = &[
    "nprobe",
    "ef",
    "search_list",
    "refine_ratio",
    "team_size",
    "search_width",
    "itopk_size",
    "min_iterations",
    "max_iterations",
    "limit",
];

fn build(index: IndexType, params: &CaseParams) -> MilvusIndexConfig {
    build_case_config(index, params)
        .unwrap_or_else(|e| panic!("failed to build {index} config: {e}"))
}

// ─── Scenarios ───

#[test]
fn test_gpu_ivf_flat_cosine_scenario() {
    let params = case_params([
        ("nlist", json!(1024)),
        ("nprobe", json!(64)),
        ("cache_dataset_on_device", json!("true")),
        ("metric_type", json!("COSINE")),
    ]);
    let cfg = build(IndexType::GpuIvfFlat, &params);

    assert_eq!(
        cfg.index_param().to_json(),
        json!({
            "metric_type": "L2",
            "index_type": "GPU_IVF_FLAT",
            "params": {"nlist": 1024, "cache_dataset_on_device": "true"},
        })
    );
    assert_eq!(
        cfg.search_param().to_json(),
        json!({
            "metric_type": "L2",
            "params": {"nprobe": 64, "refine_ratio": null},
        })
    );
}

#[test]
fn test_flat_without_metric_scenario() {
    let cfg = build(IndexType::Flat, &CaseParams::new());
    assert_eq!(
        cfg.index_param().to_json(),
        json!({"metric_type": "", "index_type": "Flat", "params": {}})
    );
    assert_eq!(
        cfg.search_param().to_json(),
        json!({"metric_type": "", "params": {}})
    );
}

#[test]
fn test_serialized_payload_matches_to_json() {
    let cfg = build(IndexType::Hnsw, &with_metric(IndexType::Hnsw, "IP"));
    let index_param = cfg.index_param();
    assert_eq!(serde_json::to_value(&index_param).unwrap(), index_param.to_json());
    let search_param = cfg.search_param();
    assert_eq!(serde_json::to_value(&search_param).unwrap(), search_param.to_json());
}

// ─── Metric normalization ───

#[test]
fn test_gpu_cosine_becomes_l2() {
    for index in GPU_FAMILIES {
        let cfg = build(index, &with_metric(index, "COSINE"));
        assert!(cfg.is_gpu_index());
        assert_eq!(cfg.parse_metric(), "L2", "{index}");
        assert_eq!(cfg.index_param().metric_type, "L2");
        assert_eq!(cfg.search_param().metric_type, "L2");
    }
}

#[test]
fn test_gpu_non_cosine_metrics_unchanged() {
    for index in GPU_FAMILIES {
        assert_eq!(build(index, &with_metric(index, "IP")).parse_metric(), "IP");
        assert_eq!(build(index, &with_metric(index, "L2")).parse_metric(), "L2");
    }
}

#[test]
fn test_cpu_metrics_unchanged() {
    for index in CPU_FAMILIES {
        for metric in ["L2", "IP", "COSINE"] {
            let cfg = build(index, &with_metric(index, metric));
            assert!(!cfg.is_gpu_index());
            assert_eq!(cfg.parse_metric(), metric, "{index}");
        }
    }
}

#[test]
fn test_no_metric_is_empty_string() {
    for index in CPU_FAMILIES.into_iter().chain(GPU_FAMILIES) {
        let cfg = build(index, &minimal_params(index));
        assert_eq!(cfg.metric_type(), None);
        assert_eq!(cfg.parse_metric(), "", "{index}");
    }
}

#[test]
fn test_metric_parsing_is_case_insensitive() {
    let cfg = build(IndexType::Flat, &with_metric(IndexType::Flat, "cosine"));
    assert_eq!(cfg.metric_type(), Some(MetricType::Cosine));
    assert_eq!(cfg.parse_metric(), "COSINE");
}

#[test]
fn test_base_parse_metric_directly() {
    let base = IndexConfigBase::new(Some(MetricType::Cosine));
    assert_eq!(base.parse_metric(IndexType::GpuCagra), "L2");
    assert_eq!(base.parse_metric(IndexType::Hnsw), "COSINE");
    assert_eq!(IndexConfigBase::default().parse_metric(IndexType::GpuCagra), "");
}

proptest! {
    #[test]
    fn test_gpu_families_never_emit_cosine(
        index in proptest::sample::select(GPU_FAMILIES.to_vec()),
        metric in proptest::sample::select(vec!["L2", "IP", "COSINE", "cosine", "Cosine"]),
    ) {
        let cfg = build_case_config(index, &with_metric(index, metric)).unwrap();
        prop_assert_ne!(cfg.parse_metric(), "COSINE");
        prop_assert_eq!(cfg.parse_metric(), cfg.search_param().metric_type);
    }
}

// ─── Build vs search separation ───

#[test]
fn test_build_payload_has_no_search_knobs() {
    for index in CPU_FAMILIES.into_iter().chain(GPU_FAMILIES) {
        let cfg = build(index, &minimal_params(index));
        assert_no_keys(&cfg.index_param().params, SEARCH_ONLY_KEYS, index.as_str());
    }
}

#[test]
fn test_search_payload_has_no_build_knobs() {
    for index in CPU_FAMILIES.into_iter().chain(GPU_FAMILIES) {
        let cfg = build(index, &minimal_params(index));
        assert_no_keys(&cfg.search_param().params, BUILD_ONLY_KEYS, index.as_str());
    }
}

#[test]
fn test_payload_top_level_keys() {
    for index in CPU_FAMILIES.into_iter().chain(GPU_FAMILIES) {
        let cfg = build(index, &minimal_params(index));

        let index_param = cfg.index_param().to_json();
        let keys: Vec<&String> = index_param.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["metric_type", "index_type", "params"]);
        assert_eq!(index_param["index_type"], index.as_str());

        let search_param = cfg.search_param().to_json();
        let keys: Vec<&String> = search_param.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["metric_type", "params"]);
    }
}

// ─── Per-family payloads ───

#[test]
fn test_hnsw_payloads() {
    let params = case_params([
        ("m", json!(16)),
        ("ef_construction", json!(256)),
        ("ef_search", json!(100)),
        ("metric_type", json!("L2")),
    ]);
    let cfg = build(IndexType::Hnsw, &params);
    assert_eq!(
        cfg.index_param().to_json(),
        json!({
            "metric_type": "L2",
            "index_type": "HNSW",
            "params": {"M": 16, "efConstruction": 256},
        })
    );
    assert_eq!(
        cfg.search_param().to_json(),
        json!({"metric_type": "L2", "params": {"ef": 100}})
    );
}

#[test]
fn test_hnsw_without_ef_renders_null() {
    let cfg = build(IndexType::Hnsw, &minimal_params(IndexType::Hnsw));
    assert_eq!(cfg.search_param().params["ef"], Value::Null);
}

#[test]
fn test_diskann_payloads() {
    let cfg = build(
        IndexType::DiskAnn,
        &case_params([("search_list", json!(100)), ("metric_type", json!("IP"))]),
    );
    assert_eq!(
        cfg.index_param().to_json(),
        json!({"metric_type": "IP", "index_type": "DISKANN", "params": {}})
    );
    assert_eq!(
        cfg.search_param().to_json(),
        json!({"metric_type": "IP", "params": {"search_list": 100}})
    );
}

#[test]
fn test_ivf_flat_and_sq8_payloads() {
    let params = case_params([("nlist", json!(256)), ("nprobe", json!(16))]);
    for (index, tag) in [(IndexType::IvfFlat, "IVF_FLAT"), (IndexType::IvfSq8, "IVF_SQ8")] {
        let cfg = build(index, &params);
        assert_eq!(
            cfg.index_param().to_json(),
            json!({"metric_type": "", "index_type": tag, "params": {"nlist": 256}})
        );
        assert_eq!(
            cfg.search_param().to_json(),
            json!({"metric_type": "", "params": {"nprobe": 16}})
        );
    }
}

#[test]
fn test_autoindex_payloads() {
    let cfg = build(IndexType::AutoIndex, &with_metric(IndexType::AutoIndex, "COSINE"));
    assert_eq!(
        cfg.index_param().to_json(),
        json!({"metric_type": "COSINE", "index_type": "AUTOINDEX", "params": {}})
    );
    assert_eq!(
        cfg.search_param().to_json(),
        json!({"metric_type": "COSINE", "params": {}})
    );
}

#[test]
fn test_gpu_ivf_flat_defaults() {
    let cfg = build(IndexType::GpuIvfFlat, &minimal_params(IndexType::GpuIvfFlat));
    assert_eq!(cfg.index_param().params["nlist"], json!(1024));
    assert_eq!(cfg.search_param().params["nprobe"], json!(64));
    assert_eq!(cfg.search_param().params["refine_ratio"], Value::Null);
}

#[test]
fn test_gpu_ivf_pq_payloads() {
    let params = case_params([
        ("cache_dataset_on_device", json!("false")),
        ("m", json!(16)),
        ("refine_ratio", json!(1.5)),
    ]);
    let cfg = build(IndexType::GpuIvfPq, &params);
    assert_eq!(
        cfg.index_param().to_json(),
        json!({
            "metric_type": "",
            "index_type": "GPU_IVF_PQ",
            "params": {
                "nlist": 1024,
                "m": 16,
                "nbits": 8,
                "cache_dataset_on_device": "false",
            },
        })
    );
    assert_eq!(
        cfg.search_param().to_json(),
        json!({"metric_type": "", "params": {"nprobe": 32, "refine_ratio": 1.5}})
    );
}

#[test]
fn test_gpu_cagra_defaults() {
    let cfg = build(IndexType::GpuCagra, &with_metric(IndexType::GpuCagra, "COSINE"));
    assert_eq!(
        cfg.index_param().to_json(),
        json!({
            "metric_type": "L2",
            "index_type": "GPU_CAGRA",
            "params": {
                "intermediate_graph_degree": 64,
                "graph_degree": 32,
                "build_algo": "IVF_PQ",
                "cache_dataset_on_device": "true",
            },
        })
    );
    assert_eq!(
        cfg.search_param().to_json(),
        json!({
            "metric_type": "L2",
            "params": {
                "team_size": 0,
                "search_width": 4,
                "itopk_size": 128,
                "min_iterations": 0,
                "max_iterations": 0,
                "refine_ratio": null,
            },
        })
    );
}

#[test]
fn test_gpu_cagra_overrides() {
    let params = case_params([
        ("cache_dataset_on_device", json!("true")),
        ("build_algo", json!("nn_descent")),
        ("graph_degree", json!(48)),
        ("itopk_size", json!(256)),
        ("max_iterations", json!(10)),
    ]);
    let cfg = build(IndexType::GpuCagra, &params);
    assert_eq!(cfg.index_param().params["build_algo"], json!("NN_DESCENT"));
    assert_eq!(cfg.index_param().params["graph_degree"], json!(48));
    assert_eq!(cfg.search_param().params["itopk_size"], json!(256));
    assert_eq!(cfg.search_param().params["max_iterations"], json!(10));
}

#[test]
fn test_gpu_brute_force_payloads() {
    let cfg = build(IndexType::GpuBruteForce, &with_metric(IndexType::GpuBruteForce, "IP"));
    assert_eq!(
        cfg.index_param().to_json(),
        json!({"metric_type": "IP", "index_type": "GPU_BRUTE_FORCE", "params": {}})
    );
    assert_eq!(
        cfg.search_param().to_json(),
        json!({"metric_type": "IP", "params": {"nprobe": 1, "limit": 10}})
    );

    let cfg = build(IndexType::GpuBruteForce, &case_params([("limit", json!(100))]));
    assert_eq!(cfg.search_param().params["limit"], json!(100));
    assert_eq!(cfg.search_param().params["nprobe"], json!(1));
}

// ─── Direct construction ───

#[test]
fn test_direct_construction_matches_registry() {
    let mut direct = GpuIvfFlatConfig::new("true");
    direct.base = IndexConfigBase::new(Some(MetricType::Cosine));
    let via_registry = build(IndexType::GpuIvfFlat, &with_metric(IndexType::GpuIvfFlat, "COSINE"));
    assert_eq!(MilvusIndexConfig::from(direct.clone()), via_registry);
    assert_eq!(direct.index_param(), via_registry.index_param());
}

#[test]
fn test_direct_defaults() {
    let pq = GpuIvfPqConfig::new("true");
    assert_eq!((pq.nlist, pq.m, pq.nbits, pq.nprobe), (1024, 0, 8, 32));

    let cagra = GpuCagraConfig::new("false");
    assert_eq!(cagra.build_algo, BuildAlgo::IvfPq);
    assert_eq!((cagra.intermediate_graph_degree, cagra.graph_degree), (64, 32));

    assert_eq!(GpuBruteForceConfig::default().limit, 10);
    assert!(GpuBruteForceConfig::default().is_gpu_index());
    assert!(!FlatConfig::default().is_gpu_index());
}

#[test]
fn test_index_type_fixed_per_variant() {
    assert_eq!(HnswConfig::INDEX, IndexType::Hnsw);
    let cfg = build(IndexType::IvfSq8, &minimal_params(IndexType::IvfSq8));
    assert_eq!(cfg.index_type(), IndexType::IvfSq8);
    assert_eq!(cfg.index_param().index_type, IndexType::IvfSq8);
}

// ─── Construction errors ───

#[test]
fn test_gpu_requires_device_cache_flag() {
    for index in DEVICE_CACHE_FAMILIES {
        let params = case_params([("metric_type", json!("L2")), ("nlist", json!(1024))]);
        assert_missing_field(build_case_config(index, &params), index, "cache_dataset_on_device");
    }
}

#[test]
fn test_null_device_cache_flag_is_missing() {
    let params = case_params([("cache_dataset_on_device", Value::Null)]);
    assert_missing_field(
        build_case_config(IndexType::GpuIvfPq, &params),
        IndexType::GpuIvfPq,
        "cache_dataset_on_device",
    );
}

#[test]
fn test_hnsw_requires_m_and_ef_construction() {
    assert_missing_field(
        build_case_config(IndexType::Hnsw, &case_params([("ef_construction", json!(200))])),
        IndexType::Hnsw,
        "m",
    );
    assert_missing_field(
        build_case_config(IndexType::Hnsw, &case_params([("m", json!(16))])),
        IndexType::Hnsw,
        "ef_construction",
    );
}

#[test]
fn test_ivf_requires_nlist() {
    for index in [IndexType::IvfFlat, IndexType::IvfSq8] {
        let params = case_params([("nprobe", json!(8))]);
        assert_missing_field(build_case_config(index, &params), index, "nlist");
    }
}

#[test]
fn test_invalid_values_rejected() {
    let negative = case_params([("nlist", json!(-1))]);
    assert_invalid_field(build_case_config(IndexType::IvfFlat, &negative), "nlist");

    let text = case_params([("nlist", json!("many"))]);
    assert_invalid_field(build_case_config(IndexType::IvfFlat, &text), "nlist");

    let metric = with_metric(IndexType::Flat, "hamming");
    assert_invalid_field(build_case_config(IndexType::Flat, &metric), "metric_type");

    let algo = case_params([
        ("cache_dataset_on_device", json!("true")),
        ("build_algo", json!("BRUTE")),
    ]);
    assert_invalid_field(build_case_config(IndexType::GpuCagra, &algo), "build_algo");

    let ratio = case_params([
        ("cache_dataset_on_device", json!("true")),
        ("refine_ratio", json!("high")),
    ]);
    assert_invalid_field(build_case_config(IndexType::GpuIvfFlat, &ratio), "refine_ratio");
}

#[test]
fn test_unrelated_params_ignored() {
    let params = case_params([
        ("db_label", json!("run-1")),
        ("nlist", json!(64)),
        ("k", json!(100)),
    ]);
    let cfg = build(IndexType::Flat, &params);
    assert!(cfg.index_param().params.is_empty());
}
