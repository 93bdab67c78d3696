// ==========================================
// Repository 层集成测试
// ==========================================
// 测试目标: 面料档案与排产记录的持久化（临时 SQLite 文件）
// ==========================================


use chrono::{Duration, Utc};
use garment_cut_planner::catalog::{builtin_materials, recommend, FabricCatalog};
use garment_cut_planner::config::{config_keys, ConfigManager};
use garment_cut_planner::domain::{AllocationRequest, PlanRecord};
use garment_cut_planner::engine::AllocationOrchestrator;
use garment_cut_planner::logging;
use garment_cut_planner::repository::{MaterialRepository, PlanRepository};
use garment_cut_planner::SizeSpec;
use test_helpers::{create_test_db, custom_material, katun};

// ==========================================
// 面料档案仓储
// ==========================================

#[test]
fn test_material_round_trip() {
    logging::init_test();
    println!("\n=== 测试：面料档案写入与读取 ===");

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = MaterialRepository::new(&db_path).expect("Failed to create repo");

    repo.upsert(&katun()).expect("Failed to upsert");
    let loaded = repo
        .find_by_name("Katun")
        .expect("Failed to query")
        .expect("Katun should exist");

    assert_eq!(loaded, katun());
    assert!(repo.find_by_name("Sutra").unwrap().is_none());
    println!("✓ 尺码顺序、单价、推荐用途一致");
}

#[test]
fn test_seed_keeps_catalog_order() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = MaterialRepository::new(&db_path).expect("Failed to create repo");

    let seeded = repo.seed_if_empty(&builtin_materials()).unwrap();
    assert_eq!(seeded, 7);
    assert_eq!(repo.seed_if_empty(&builtin_materials()).unwrap(), 0);

    let names = repo.material_names().unwrap();
    assert_eq!(
        names,
        vec!["Katun", "Polyester", "Rayon", "Wool", "Spandex", "Linen", "Denim"]
    );
    assert_eq!(repo.list_all().unwrap(), builtin_materials());
}

#[test]
fn test_upsert_replaces_sizes_and_keeps_position() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = MaterialRepository::new(&db_path).expect("Failed to create repo");
    repo.seed_if_empty(&builtin_materials()).unwrap();

    let mut changed = katun();
    changed.price_per_meter = 22000.0;
    changed.sizes = vec![SizeSpec::new("M", 2.1, 56000.0), SizeSpec::new("S", 1.4, 44000.0)];
    changed.recommended_uses = vec!["Kemeja".to_string()];
    repo.upsert(&changed).unwrap();

    let names = repo.material_names().unwrap();
    assert_eq!(names.first().map(String::as_str), Some("Katun"));
    assert_eq!(repo.count().unwrap(), 7);

    let loaded = repo.find_by_name("Katun").unwrap().unwrap();
    assert_eq!(loaded, changed);
}

#[test]
fn test_delete_cascades() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = MaterialRepository::new(&db_path).expect("Failed to create repo");

    repo.upsert(&katun()).unwrap();
    assert!(repo.delete("Katun").unwrap());
    assert!(!repo.delete("Katun").unwrap());
    assert_eq!(repo.count().unwrap(), 0);

    // 重新写入同名面料不会与残留尺码冲突
    repo.upsert(&katun()).unwrap();
    assert_eq!(repo.find_by_name("Katun").unwrap().unwrap().sizes.len(), 4);
}

#[test]
fn test_repository_as_catalog_recommendation() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = MaterialRepository::new(&db_path).expect("Failed to create repo");
    repo.seed_if_empty(&builtin_materials()).unwrap();

    assert_eq!(recommend(&repo, "Jas").unwrap(), vec!["Polyester", "Wool"]);
    // 无匹配产品时返回全部面料
    assert_eq!(recommend(&repo, "Topi").unwrap().len(), 7);
}

#[test]
fn test_batch_upsert_is_atomic() {
    logging::init_test();
    println!("\n=== 测试：批量写入面料档案（单一事务） ===");

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = MaterialRepository::new(&db_path).expect("Failed to create repo");
    repo.upsert(&katun()).unwrap();

    // 第二条面料尺码重复，违反 (material_name, size_code) 主键
    let batch = vec![
        custom_material("Sutra", &[("S", 1.3, 90000.0)], 60000.0),
        custom_material("Rusak", &[("S", 1.0, 1.0), ("S", 2.0, 2.0)], 1000.0),
    ];
    assert!(repo.batch_upsert(&batch).is_err());
    assert_eq!(repo.count().unwrap(), 1);
    assert!(repo.find_by_name("Sutra").unwrap().is_none());
    println!("✓ 批内任一失败整体回滚");

    let batch = vec![
        custom_material("Sutra", &[("S", 1.3, 90000.0)], 60000.0),
        custom_material("Katun", &[("M", 2.0, 55000.0)], 21000.0),
    ];
    assert_eq!(repo.batch_upsert(&batch).unwrap(), 2);
    assert_eq!(repo.material_names().unwrap(), vec!["Katun", "Sutra"]);
    assert_eq!(repo.find_by_name("Katun").unwrap().unwrap().sizes.len(), 1);
    assert_eq!(repo.batch_upsert(&[]).unwrap(), 0);
    println!("✓ 批量写入成功，已有面料保持位置");
}

// ==========================================
// 排产记录仓储
// ==========================================

fn sample_record(material_meters: f64, created_by: Option<&str>) -> PlanRecord {
    let request = AllocationRequest::new("Katun", material_meters)
        .with_percentages(&[("S", 50.0), ("M", 50.0)])
        .with_minimize_remainder(true);
    let result = AllocationOrchestrator::default()
        .allocate(&katun(), &request)
        .expect("allocation should succeed");
    PlanRecord::new(request, result, created_by)
}

#[test]
fn test_plan_round_trip() {
    logging::init_test();
    println!("\n=== 测试：排产记录写入与读取 ===");

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = PlanRepository::new(&db_path).expect("Failed to create repo");

    let record = sample_record(10.0, Some("operator01"));
    repo.insert(&record).expect("Failed to insert");

    let loaded = repo
        .find_by_id(&record.plan_id)
        .unwrap()
        .expect("record should exist");
    assert_eq!(loaded, record);
    assert_eq!(loaded.result.count_of("S"), 4);
    println!("✓ 请求与结果完整还原");

    assert!(repo.find_by_id("missing").unwrap().is_none());
}

#[test]
fn test_plan_listing_order_and_filters() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = PlanRepository::new(&db_path).expect("Failed to create repo");

    let mut older = sample_record(10.0, None);
    older.created_at = Utc::now() - Duration::hours(2);
    let newer = sample_record(20.0, None);

    let linen = custom_material("Linen", &[("S", 1.7, 60000.0)], 25000.0);
    let linen_request = AllocationRequest::new("Linen", 5.0);
    let linen_result = AllocationOrchestrator::default()
        .allocate(&linen, &linen_request)
        .unwrap();
    let mut linen_record = PlanRecord::new(linen_request, linen_result, None);
    linen_record.created_at = Utc::now() - Duration::hours(1);

    repo.insert(&older).unwrap();
    repo.insert(&newer).unwrap();
    repo.insert(&linen_record).unwrap();

    let recent: Vec<String> = repo
        .list_recent(10)
        .unwrap()
        .into_iter()
        .map(|r| r.plan_id)
        .collect();
    assert_eq!(
        recent,
        vec![newer.plan_id.clone(), linen_record.plan_id.clone(), older.plan_id.clone()]
    );
    assert_eq!(repo.list_recent(1).unwrap().len(), 1);

    let katun_plans = repo.list_by_material("Katun").unwrap();
    assert_eq!(katun_plans.len(), 2);
    assert!(katun_plans.iter().all(|r| r.request.material == "Katun"));

    assert!(repo.delete(&older.plan_id).unwrap());
    assert_eq!(repo.list_by_material("Katun").unwrap().len(), 1);
}

// ==========================================
// 配置管理器
// ==========================================

#[test]
fn test_config_manager_file_backed() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");

    {
        let config = ConfigManager::new(&db_path).unwrap();
        config
            .set_config_value(config_keys::MINIMIZE_REMAINDER_DEFAULT, "true")
            .unwrap();
        config
            .set_config_value(config_keys::CONSERVATION_TOLERANCE, "0.001")
            .unwrap();
    }

    // 重新打开后配置仍在
    let config = ConfigManager::new(&db_path).unwrap();
    let allocation = config.get_allocation_config().unwrap();
    assert!(allocation.minimize_remainder_default);
    assert_eq!(allocation.conservation_tolerance, 0.001);
}
