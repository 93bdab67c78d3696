// ==========================================
// 服装裁剪排产系统 - 命令行主入口
// ==========================================
// 子命令: materials / recommend / plan / import / history / config
// ==========================================

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use garment_cut_planner::api::{ApiResult, DEFAULT_HISTORY_LIMIT};
use garment_cut_planner::app::{get_default_db_path, AppState, DB_PATH_ENV};
use garment_cut_planner::catalog::default_products;
use garment_cut_planner::config::config_keys;
use garment_cut_planner::domain::{AllocationRequest, AllocationResult, MaterialProfile, PlanRecord};
use garment_cut_planner::i18n::{self, t, t_with_args};
use garment_cut_planner::{logging, APP_NAME, VERSION};

#[derive(Parser)]
#[command(name = "garment-cut-planner")]
#[command(version)]
#[command(about = "服装裁剪排产 - 按面料总量计算利润最优的成衣件数")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// 数据库文件路径
    #[arg(long, env = DB_PATH_ENV, global = true)]
    db: Option<String>,

    /// 界面语言（zh-CN / en），覆盖已保存的配置
    #[arg(long, global = true)]
    locale: Option<String>,

    /// 日志以 JSON 行格式输出到 stderr
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// 列出面料目录
    Materials(MaterialsArgs),
    /// 按产品推荐面料
    Recommend(RecommendArgs),
    /// 计算排产方案
    Plan(PlanArgs),
    /// 从 CSV 导入面料目录
    Import(ImportArgs),
    /// 查看排产记录
    History(HistoryArgs),
    /// 读写系统配置
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Parser)]
struct MaterialsArgs {
    /// 以 JSON 输出
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct RecommendArgs {
    /// 产品名称（不填时列出可选产品）
    product: Option<String>,
}

#[derive(Parser)]
struct PlanArgs {
    /// 面料名称
    #[arg(long)]
    material: String,

    /// 面料总量（米）
    #[arg(long)]
    meters: f64,

    /// 关注尺码，可重复（不填为全部尺码）
    #[arg(long = "size")]
    sizes: Vec<String>,

    /// 尺码比例，格式 S=50，可重复
    #[arg(long = "percent", value_parser = parse_percent)]
    percents: Vec<(String, f64)>,

    /// 开启余料压缩
    #[arg(long, conflicts_with = "keep_remainder")]
    minimize_remainder: bool,

    /// 关闭余料压缩
    #[arg(long)]
    keep_remainder: bool,

    /// 保存排产记录
    #[arg(long)]
    save: bool,

    /// 记录的操作人
    #[arg(long, requires = "save")]
    operator: Option<String>,

    /// 以 JSON 输出
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct ImportArgs {
    /// CSV 文件路径
    path: String,
}

#[derive(Parser)]
struct HistoryArgs {
    /// 查看单条记录
    #[arg(long)]
    id: Option<String>,

    /// 只看某面料的记录
    #[arg(long, conflicts_with = "id")]
    material: Option<String>,

    /// 返回条数
    #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
    limit: usize,

    /// 以 JSON 输出
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// 读取配置（不填键时列出全部）
    Get { key: Option<String> },
    /// 写入配置
    Set { key: String, value: String },
}

fn parse_percent(raw: &str) -> std::result::Result<(String, f64), String> {
    let (size, pct) = raw
        .split_once('=')
        .ok_or_else(|| format!("格式应为 尺码=比例: {}", raw))?;
    let size = size.trim();
    if size.is_empty() {
        return Err(format!("尺码为空: {}", raw));
    }
    let pct: f64 = pct
        .trim()
        .parse()
        .map_err(|_| format!("比例不是数值: {}", raw))?;
    Ok((size.to_string(), pct))
}

/// ApiError 转为本地化的命令行错误
fn api<T>(result: ApiResult<T>) -> Result<T> {
    result.map_err(|err| {
        tracing::debug!(error = ?err, "API调用失败");
        anyhow!(err.user_message())
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_json);
    tracing::info!(app = APP_NAME, version = VERSION, "启动");

    let db_path = cli.db.clone().unwrap_or_else(get_default_db_path);
    let state = api(AppState::new(db_path))?;

    if let Some(locale) = &cli.locale {
        if !i18n::set_locale(locale) {
            return Err(anyhow!("不支持的语言: {}", locale));
        }
    }

    match cli.command {
        Command::Materials(args) => {
            let materials = api(state.planning_api.list_materials())?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&materials)?);
            } else {
                for material in &materials {
                    print_material(material);
                }
            }
        }
        Command::Recommend(args) => match args.product {
            Some(product) => {
                for name in api(state.planning_api.recommend_materials(&product))? {
                    println!("{}", name);
                }
            }
            None => {
                for product in default_products() {
                    println!("{}", product);
                }
            }
        },
        Command::Plan(args) => run_plan(&state, args)?,
        Command::Import(args) => {
            let response = api(state.import_api.import_catalog(&args.path))?;
            println!(
                "{}",
                t_with_args(
                    "catalog.imported",
                    &[
                        ("materials", response.materials.to_string().as_str()),
                        ("sizes", response.sizes.to_string().as_str()),
                    ],
                )
            );
        }
        Command::History(args) => {
            let records = match (&args.id, &args.material) {
                (Some(id), _) => vec![api(state.planning_api.get_plan(id))?],
                (None, Some(material)) => api(state.planning_api.list_plans_by_material(material))?,
                (None, None) => api(state.planning_api.list_plans(args.limit))?,
            };
            if args.json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                for record in &records {
                    print_history_line(record);
                }
            }
        }
        Command::Config { action } => match action {
            ConfigAction::Get { key: Some(key) } => {
                let value = api(state.config_manager.get_config_value(&key).map_err(Into::into))?;
                println!("{}", value.unwrap_or_default());
            }
            ConfigAction::Get { key: None } => {
                let configs = api(state.config_manager.list_configs().map_err(Into::into))?;
                for (key, value) in configs {
                    println!("{} = {}", key, value);
                }
            }
            ConfigAction::Set { key, value } => {
                if key == config_keys::LOCALE && !i18n::SUPPORTED_LOCALES.contains(&value.as_str()) {
                    return Err(anyhow!("不支持的语言: {}", value));
                }
                api(state.config_manager.set_config_value(&key, &value).map_err(Into::into))?;
                println!("{}", t("common.success"));
            }
        },
    }

    Ok(())
}

fn run_plan(state: &AppState, args: PlanArgs) -> Result<()> {
    let minimize = if args.minimize_remainder {
        true
    } else if args.keep_remainder {
        false
    } else {
        state.planning_api.config().minimize_remainder_default
    };

    let mut request = AllocationRequest::new(&args.material, args.meters).with_minimize_remainder(minimize);
    if !args.sizes.is_empty() {
        request = request.with_focus_sizes(&args.sizes);
    }
    if !args.percents.is_empty() {
        request = request.with_percentages(&args.percents);
    }

    if args.save {
        let record = api(state
            .planning_api
            .plan_and_save(&request, args.operator.as_deref()))?;
        print_result(&record.result, args.json)?;
        if !args.json {
            println!(
                "{}",
                t_with_args("report.saved", &[("plan_id", record.plan_id.as_str())])
            );
        }
    } else {
        let result = api(state.planning_api.plan(&request))?;
        print_result(&result, args.json)?;
    }
    Ok(())
}

fn print_material(material: &MaterialProfile) {
    println!(
        "{} | {}/m | {} | {}",
        material.name,
        format_rupiah(material.price_per_meter),
        material.elasticity,
        material.recommended_uses.join(", ")
    );
    for spec in &material.sizes {
        println!(
            "    {:<4} {:>5.2} m  {}",
            spec.size,
            spec.meters_per_unit,
            format_rupiah(spec.profit_per_unit)
        );
    }
}

fn print_result(result: &AllocationResult, json: bool) -> Result<()> {
    if json {
        let output = serde_json::to_string_pretty(result).context("序列化排产结果失败")?;
        println!("{}", output);
        return Ok(());
    }

    println!(
        "{}",
        t_with_args(
            "report.title",
            &[
                ("material", result.material.as_str()),
                ("total", format!("{:.2}", result.total_meters).as_str()),
            ],
        )
    );

    if result.total_garments() == 0 {
        println!("{}", t("report.no_output"));
    } else {
        println!(
            "{:<6}{:>8}{:>14}{:>14}{:>16}{:>18}",
            t("report.size"),
            t("report.count"),
            t("report.meters_per_unit"),
            t("report.total_meters"),
            t("report.profit_per_unit"),
            t("report.total_profit"),
        );
        for line in &result.lines {
            println!(
                "{:<6}{:>8}{:>14.2}{:>14.2}{:>16}{:>18}",
                line.size,
                line.count,
                line.meters_per_unit,
                line.total_meters,
                format_rupiah(line.profit_per_unit),
                format_rupiah(line.total_profit),
            );
        }
    }

    println!(
        "{}",
        t_with_args(
            "report.summary",
            &[
                ("profit", format_rupiah(result.total_profit).as_str()),
                ("remaining", format!("{:.2}", result.remaining_meters).as_str()),
                ("efficiency", format!("{:.1}", result.efficiency_pct()).as_str()),
            ],
        )
    );
    Ok(())
}

fn print_history_line(record: &PlanRecord) {
    let counts: Vec<String> = record
        .result
        .counts_by_size()
        .into_iter()
        .map(|(size, count)| format!("{}={}", size, count))
        .collect();
    println!(
        "{} {} {} {:.2}m [{}] {}",
        record.plan_id,
        record.created_at.format("%Y-%m-%d %H:%M"),
        record.request.material,
        record.request.total_meters,
        counts.join(" "),
        format_rupiah(record.result.total_profit)
    );
}

/// 印尼盾金额格式: Rp 1.234.567
fn format_rupiah(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-Rp {}", grouped)
    } else {
        format!("Rp {}", grouped)
    }
}
