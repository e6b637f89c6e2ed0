//! Command line surface: one subcommand per Milvus index family.
//!
//! Flags are collected into [`CaseParams`], layered over config defaults and
//! rendered into the connection and index payloads. Nothing is sent to the
//! database.

use clap::{Args, Parser, Subcommand};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::config::{Config, MilvusSection};
use crate::error::{BenchError, Result};
use crate::milvus::{build_case_config, registry, MilvusConfig, DB_NAME};
use crate::params::{resolve_parameters, CaseParams};
use crate::types::IndexType;

#[derive(Debug, Parser)]
#[command(
    name = "vdbbench-milvus",
    about = "Render Milvus connection and index parameters for a benchmark case"
)]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Milvus uri connection string; required unless MILVUS_URI or the config file sets it
    #[arg(long, global = true)]
    pub uri: Option<String>,

    #[arg(long, global = true)]
    pub user: Option<String>,

    #[arg(long, global = true)]
    pub password: Option<String>,

    #[arg(long, global = true)]
    pub db_label: Option<String>,

    /// L2, IP or COSINE
    #[arg(long, global = true)]
    pub metric_type: Option<String>,
}

impl CommonArgs {
    /// Connection fields: flags override the `[milvus]` section.
    pub fn connection_fields(&self, section: &MilvusSection) -> Map<String, Value> {
        let mut fields = section.to_fields();
        for (name, flag) in [
            ("uri", &self.uri),
            ("user", &self.user),
            ("password", &self.password),
            ("db_label", &self.db_label),
        ] {
            if let Some(v) = flag {
                fields.insert(name.into(), Value::from(v.clone()));
            }
        }
        fields
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// AUTOINDEX, Milvus picks the index
    AutoIndex,
    /// Exact brute-force index
    Flat,
    Hnsw(HnswArgs),
    #[command(name = "diskann")]
    DiskAnn(DiskAnnArgs),
    IvfFlat(IvfArgs),
    IvfSq8(IvfArgs),
    GpuIvfFlat(GpuIvfFlatArgs),
    GpuIvfPq(GpuIvfPqArgs),
    GpuCagra(GpuCagraArgs),
    GpuBruteForce(GpuBruteForceArgs),
    /// List the index types Milvus supports here
    List,
}

impl Command {
    pub fn index_type(&self) -> Option<IndexType> {
        match self {
            Command::AutoIndex => Some(IndexType::AutoIndex),
            Command::Flat => Some(IndexType::Flat),
            Command::Hnsw(_) => Some(IndexType::Hnsw),
            Command::DiskAnn(_) => Some(IndexType::DiskAnn),
            Command::IvfFlat(_) => Some(IndexType::IvfFlat),
            Command::IvfSq8(_) => Some(IndexType::IvfSq8),
            Command::GpuIvfFlat(_) => Some(IndexType::GpuIvfFlat),
            Command::GpuIvfPq(_) => Some(IndexType::GpuIvfPq),
            Command::GpuCagra(_) => Some(IndexType::GpuCagra),
            Command::GpuBruteForce(_) => Some(IndexType::GpuBruteForce),
            Command::List => None,
        }
    }

    /// Family-specific flags that were given on the command line.
    pub fn case_params(&self) -> CaseParams {
        let mut params = CaseParams::new();
        match self {
            Command::AutoIndex | Command::Flat | Command::List => {}
            Command::Hnsw(args) => args.write_params(&mut params),
            Command::DiskAnn(args) => args.write_params(&mut params),
            Command::IvfFlat(args) | Command::IvfSq8(args) => args.write_params(&mut params),
            Command::GpuIvfFlat(args) => args.write_params(&mut params),
            Command::GpuIvfPq(args) => args.write_params(&mut params),
            Command::GpuCagra(args) => args.write_params(&mut params),
            Command::GpuBruteForce(args) => args.write_params(&mut params),
        }
        params
    }
}

/// Flag groups that contribute case parameters.
pub trait WriteParams {
    fn write_params(&self, params: &mut CaseParams);
}

#[derive(Debug, Clone, Default, Args)]
pub struct HnswArgs {
    /// hnsw m
    #[arg(long)]
    pub m: Option<u32>,
    /// hnsw efConstruction
    #[arg(long)]
    pub ef_construction: Option<u32>,
    /// hnsw ef
    #[arg(long)]
    pub ef_search: Option<u32>,
}

impl WriteParams for HnswArgs {
    fn write_params(&self, params: &mut CaseParams) {
        params
            .set_opt("m", self.m)
            .set_opt("ef_construction", self.ef_construction)
            .set_opt("ef_search", self.ef_search);
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct DiskAnnArgs {
    #[arg(long)]
    pub search_list: Option<u32>,
}

impl WriteParams for DiskAnnArgs {
    fn write_params(&self, params: &mut CaseParams) {
        params.set_opt("search_list", self.search_list);
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct IvfArgs {
    /// Number of inverted lists
    #[arg(long)]
    pub nlist: Option<u32>,
    /// Number of lists probed per query
    #[arg(long)]
    pub nprobe: Option<u32>,
}

impl WriteParams for IvfArgs {
    fn write_params(&self, params: &mut CaseParams) {
        params
            .set_opt("nlist", self.nlist)
            .set_opt("nprobe", self.nprobe);
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct GpuArgs {
    /// "true" or "false"
    #[arg(long)]
    pub cache_dataset_on_device: Option<String>,
    #[arg(long, value_parser = parse_ratio)]
    pub refine_ratio: Option<f64>,
}

/// NaN and infinities have no JSON encoding and would render as `null`.
fn parse_ratio(raw: &str) -> std::result::Result<f64, String> {
    let ratio: f64 = raw.parse().map_err(|e| format!("{e}"))?;
    if ratio.is_finite() && ratio >= 0.0 {
        Ok(ratio)
    } else {
        Err(format!("expected a finite non-negative number, got {raw}"))
    }
}

impl WriteParams for GpuArgs {
    fn write_params(&self, params: &mut CaseParams) {
        params
            .set_opt("cache_dataset_on_device", self.cache_dataset_on_device.clone())
            .set_opt("refine_ratio", self.refine_ratio);
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct GpuIvfFlatArgs {
    #[command(flatten)]
    pub ivf: IvfArgs,
    #[command(flatten)]
    pub gpu: GpuArgs,
}

impl WriteParams for GpuIvfFlatArgs {
    fn write_params(&self, params: &mut CaseParams) {
        self.ivf.write_params(params);
        self.gpu.write_params(params);
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct GpuIvfPqArgs {
    #[command(flatten)]
    pub ivf: IvfArgs,
    #[command(flatten)]
    pub gpu: GpuArgs,
    /// Number of sub-quantizers
    #[arg(long)]
    pub m: Option<u32>,
    /// Bits per sub-quantizer
    #[arg(long)]
    pub nbits: Option<u32>,
}

impl WriteParams for GpuIvfPqArgs {
    fn write_params(&self, params: &mut CaseParams) {
        self.ivf.write_params(params);
        self.gpu.write_params(params);
        params.set_opt("m", self.m).set_opt("nbits", self.nbits);
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct GpuCagraArgs {
    #[command(flatten)]
    pub gpu: GpuArgs,
    #[arg(long)]
    pub intermediate_graph_degree: Option<u32>,
    #[arg(long)]
    pub graph_degree: Option<u32>,
    /// IVF_PQ or NN_DESCENT
    #[arg(long)]
    pub build_algo: Option<String>,
    #[arg(long)]
    pub team_size: Option<u32>,
    #[arg(long)]
    pub search_width: Option<u32>,
    #[arg(long)]
    pub itopk_size: Option<u32>,
    #[arg(long)]
    pub min_iterations: Option<u32>,
    #[arg(long)]
    pub max_iterations: Option<u32>,
}

impl WriteParams for GpuCagraArgs {
    fn write_params(&self, params: &mut CaseParams) {
        self.gpu.write_params(params);
        params
            .set_opt("intermediate_graph_degree", self.intermediate_graph_degree)
            .set_opt("graph_degree", self.graph_degree)
            .set_opt("build_algo", self.build_algo.clone())
            .set_opt("team_size", self.team_size)
            .set_opt("search_width", self.search_width)
            .set_opt("itopk_size", self.itopk_size)
            .set_opt("min_iterations", self.min_iterations)
            .set_opt("max_iterations", self.max_iterations);
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct GpuBruteForceArgs {
    /// Top-k for search
    #[arg(long)]
    pub limit: Option<u32>,
}

impl WriteParams for GpuBruteForceArgs {
    fn write_params(&self, params: &mut CaseParams) {
        params.set_opt("limit", self.limit);
    }
}

/// Resolve and render everything the command describes as one JSON document.
pub fn render(cli: &Cli, config: &Config) -> Result<Value> {
    let Some(index) = cli.command.index_type() else {
        let names: Vec<&str> = registry::registered_index_types()
            .iter()
            .map(IndexType::name)
            .collect();
        return Ok(json!({ "db": DB_NAME, "index_types": names }));
    };

    let fields = cli.common.connection_fields(&config.milvus);
    if matches!(fields.get("uri"), None | Some(Value::Null)) {
        return Err(BenchError::Validation(
            "uri is required: pass --uri, set MILVUS_URI or [milvus] uri".to_string(),
        ));
    }
    let db_config = MilvusConfig::from_fields(&fields)?;

    let mut user = cli.command.case_params();
    user.set_opt("metric_type", cli.common.metric_type.clone());
    let params = resolve_parameters(index, &user, &config.defaults);
    let case_config = build_case_config(index, &params)?;

    info!(
        index = %index,
        db_label = %db_config.common.db_label,
        metric_type = case_config.parse_metric(),
        "case rendered"
    );

    Ok(json!({
        "db": DB_NAME,
        "db_config": db_config.redacted(),
        "index_param": case_config.index_param().to_json(),
        "search_param": case_config.search_param().to_json(),
    }))
}
