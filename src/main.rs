// ==========================================
// 学生转社分发系统 - 命令行入口
// ==========================================
// 用法:
//   club-transfer run <学生志愿表> <社团缺额表> [--config <配置.json>] [--out <目录>]
//   club-transfer template <学生志愿表> [--out <缺额表范本.csv>]
// ==========================================

use anyhow::{bail, Context, Result};
use club_transfer::config::AllocationConfig;
use club_transfer::exporter::ReportWriter;
use club_transfer::importer::{quota_template, AllocationImporter, DqLevel};
use club_transfer::{logging, AllocationOrchestrator, APP_NAME, VERSION};
use std::path::PathBuf;

const USAGE: &str = "用法:
  club-transfer run <学生志愿表.csv|xlsx> <社团缺额表.csv|xlsx> [--config <配置.json>] [--out <输出目录>]
  club-transfer template <学生志愿表.csv|xlsx> [--out <缺额表范本.csv>]";

/// 位置参数 + 选项
struct CliArgs {
    positional: Vec<String>,
    config: Option<PathBuf>,
    out: Option<PathBuf>,
}

impl CliArgs {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut positional = Vec::new();
        let mut config = None;
        let mut out = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    config = Some(PathBuf::from(
                        args.next().context("--config 需要文件路径")?,
                    ))
                }
                "--out" => out = Some(PathBuf::from(args.next().context("--out 需要路径")?)),
                other if other.starts_with("--") => bail!("未知选项: {}\n{}", other, USAGE),
                _ => positional.push(arg),
            }
        }

        Ok(Self {
            positional,
            config,
            out,
        })
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<AllocationConfig> {
    let config = match path {
        Some(path) => AllocationConfig::load(path)
            .with_context(|| format!("读取配置失败: {}", path.display()))?,
        None => AllocationConfig::load_default().context("读取默认配置失败")?,
    };
    config.validate()?;
    Ok(config)
}

fn run(args: CliArgs) -> Result<()> {
    let [students_path, quotas_path] = args.positional.as_slice() else {
        bail!("run 需要学生志愿表与社团缺额表\n{}", USAGE);
    };
    let config = load_config(args.config.as_ref())?;
    let out_dir = args.out.unwrap_or_else(|| PathBuf::from("output"));

    // === 导入 ===
    let importer = AllocationImporter::new(config.max_preference_slots);
    let batch = importer.import(students_path, quotas_path)?;

    for violation in &batch.dq_report.violations {
        if violation.level != DqLevel::Info {
            eprintln!(
                "[{:?}] 第 {} 行 {}: {}",
                violation.level, violation.row_number, violation.field, violation.message
            );
        }
    }
    batch
        .dq_report
        .ensure_no_errors()
        .context("资料有误，请修正后重新执行")?;

    // === 分发 ===
    let orchestrator = AllocationOrchestrator::new(config);
    let output = orchestrator.execute(batch.students, &batch.quotas)?;

    // === 输出 ===
    let files = ReportWriter::write_all(&output, &out_dir)?;

    println!("run_id={}", output.run_id);
    println!(
        "学生 {} 人，社团 {} 个；递补 {} 笔，交换 {} 笔，成功转社 {} 人",
        output.stats.individuals,
        output.stats.resources,
        output.stats.moves,
        output.stats.swaps,
        output.transferred().count()
    );
    if output.stats.budget_exhausted {
        println!(
            "注意: 连锁递补已达轮数上限 ({})，结果为当下状态",
            output.stats.chain_budget
        );
    }
    for file in files {
        println!("  {}", file.display());
    }
    Ok(())
}

fn template(args: CliArgs) -> Result<()> {
    let [students_path] = args.positional.as_slice() else {
        bail!("template 需要学生志愿表\n{}", USAGE);
    };
    let config = load_config(args.config.as_ref())?;
    let out = args
        .out
        .unwrap_or_else(|| PathBuf::from("quota_template.csv"));

    let students = AllocationImporter::new(config.max_preference_slots)
        .import_students(students_path)?;
    let records: Vec<_> = students.rows.into_iter().map(|row| row.record).collect();
    let template = quota_template(&records);

    ReportWriter::write_quota_template(&out, &template)?;
    println!("已产生 {} 个社团的缺额表范本: {}", template.len(), out.display());
    Ok(())
}

fn main() -> Result<()> {
    logging::init();
    tracing::info!("{} v{}", APP_NAME, VERSION);

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_default();
    let cli_args = CliArgs::parse(args)?;

    match command.as_str() {
        "run" => run(cli_args),
        "template" => template(cli_args),
        _ => {
            eprintln!("{}", USAGE);
            bail!("未知命令: '{}'", command)
        }
    }
}
