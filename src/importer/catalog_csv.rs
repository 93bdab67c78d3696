// ==========================================
// 服装裁剪排产系统 - 面料目录 CSV 导入
// ==========================================
// 格式: 长表，每行一个 面料×尺码
// 表头: material,size,meters_per_unit,profit_per_unit,price_per_meter,elasticity,recommended_uses
// recommended_uses 以 '|' 分隔，同一面料各行须一致（可只在首行填写）
// ==========================================

use crate::domain::material::{MaterialProfile, SizeSpec};
use crate::domain::types::Elasticity;
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::MaterialRepository;
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, instrument};

/// 推荐用途分隔符
pub const USES_SEPARATOR: char = '|';

#[derive(Debug, Deserialize)]
struct CatalogCsvRow {
    material: String,
    size: String,
    meters_per_unit: f64,
    profit_per_unit: f64,
    price_per_meter: f64,
    elasticity: String,
    #[serde(default)]
    recommended_uses: String,
}

/// 导入汇总
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogImportSummary {
    pub materials: usize,
    pub sizes: usize,
}

// ==========================================
// CatalogCsvImporter - 面料目录导入器
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct CatalogCsvImporter;

impl CatalogCsvImporter {
    pub fn new() -> Self {
        Self
    }

    /// 解析 CSV 文件
    pub fn parse_file(&self, path: &Path) -> ImportResult<Vec<MaterialProfile>> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => {}
            other => {
                return Err(ImportError::UnsupportedFormat(
                    other.unwrap_or("").to_string(),
                ))
            }
        }

        let file = File::open(path)?;
        self.parse_reader(file)
    }

    /// 解析 CSV 内容（面料按首次出现顺序，尺码按行顺序）
    pub fn parse_reader<R: Read>(&self, reader: R) -> ImportResult<Vec<MaterialProfile>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut materials: Vec<MaterialProfile> = Vec::new();

        for (idx, record) in reader.deserialize::<CatalogCsvRow>().enumerate() {
            // 表头占第 1 行
            let row_no = idx + 2;
            let row = record.map_err(|e| ImportError::CsvParseError {
                row: e.position().map(|p| p.line() as usize).unwrap_or(row_no),
                message: e.to_string(),
            })?;

            if row.material.is_empty() {
                return Err(field_error(row_no, "material", "面料名称为空"));
            }
            if row.size.is_empty() {
                return Err(field_error(row_no, "size", "尺码为空"));
            }
            if !row.meters_per_unit.is_finite() || row.meters_per_unit <= 0.0 {
                return Err(field_error(
                    row_no,
                    "meters_per_unit",
                    &format!("必须大于0: {}", row.meters_per_unit),
                ));
            }
            if !row.profit_per_unit.is_finite() {
                return Err(field_error(row_no, "profit_per_unit", "不是有限数值"));
            }
            if !row.price_per_meter.is_finite() || row.price_per_meter < 0.0 {
                return Err(field_error(
                    row_no,
                    "price_per_meter",
                    &format!("不能为负: {}", row.price_per_meter),
                ));
            }
            let elasticity: Elasticity = row
                .elasticity
                .parse()
                .map_err(|message: String| field_error(row_no, "elasticity", &message))?;
            let uses: Vec<String> = row
                .recommended_uses
                .split(USES_SEPARATOR)
                .map(|u| u.trim())
                .filter(|u| !u.is_empty())
                .map(|u| u.to_string())
                .collect();

            let spec = SizeSpec::new(&row.size, row.meters_per_unit, row.profit_per_unit);

            match materials.iter_mut().find(|m| m.name == row.material) {
                Some(existing) => {
                    if existing.price_per_meter != row.price_per_meter {
                        return Err(inconsistent(row_no, &row.material, "price_per_meter"));
                    }
                    if existing.elasticity != elasticity {
                        return Err(inconsistent(row_no, &row.material, "elasticity"));
                    }
                    if !uses.is_empty() {
                        if existing.recommended_uses.is_empty() {
                            existing.recommended_uses = uses;
                        } else if existing.recommended_uses != uses {
                            return Err(inconsistent(row_no, &row.material, "recommended_uses"));
                        }
                    }
                    if existing.has_size(&spec.size) {
                        return Err(ImportError::DuplicateSize {
                            row: row_no,
                            material: row.material,
                            size: spec.size,
                        });
                    }
                    existing.sizes.push(spec);
                }
                None => materials.push(MaterialProfile {
                    name: row.material,
                    sizes: vec![spec],
                    price_per_meter: row.price_per_meter,
                    elasticity,
                    recommended_uses: uses,
                }),
            }
        }

        if materials.is_empty() {
            return Err(ImportError::EmptyFile);
        }
        Ok(materials)
    }

    /// 解析并写入面料档案仓储（同名面料整体覆盖，单一事务）
    #[instrument(skip(self, repo), fields(path = %path.display()))]
    pub fn import_into(
        &self,
        repo: &MaterialRepository,
        path: &Path,
    ) -> ImportResult<CatalogImportSummary> {
        let materials = self.parse_file(path)?;
        let summary = CatalogImportSummary {
            materials: materials.len(),
            sizes: materials.iter().map(|m| m.sizes.len()).sum(),
        };

        repo.batch_upsert(&materials)?;

        info!(materials = summary.materials, sizes = summary.sizes, "面料目录导入完成");
        Ok(summary)
    }
}

fn field_error(row: usize, field: &str, message: &str) -> ImportError {
    ImportError::FieldValueError {
        row,
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn inconsistent(row: usize, material: &str, field: &str) -> ImportError {
    ImportError::InconsistentMaterial {
        row,
        material: material.to_string(),
        field: field.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "material,size,meters_per_unit,profit_per_unit,price_per_meter,elasticity,recommended_uses\n";

    fn parse(body: &str) -> ImportResult<Vec<MaterialProfile>> {
        let content = format!("{}{}", HEADER, body);
        CatalogCsvImporter::new().parse_reader(content.as_bytes())
    }

    #[test]
    fn test_parse_groups_rows_by_material() {
        let materials = parse(
            "Katun,S,1.5,45000,20000,Rendah,Kemeja|Baju santai\n\
             Katun,M,2.0,55000,20000,Rendah,\n\
             Sutra,S,1.3,90000,60000,MEDIUM,Gaun\n",
        )
        .unwrap();

        assert_eq!(materials.len(), 2);
        assert_eq!(materials[0].name, "Katun");
        assert_eq!(materials[0].size_codes().collect::<Vec<_>>(), vec!["S", "M"]);
        assert_eq!(materials[0].recommended_uses, vec!["Kemeja", "Baju santai"]);
        assert_eq!(materials[1].elasticity, Elasticity::Medium);
    }

    #[test]
    fn test_parse_rejects_non_positive_meters() {
        let err = parse("Katun,S,0,45000,20000,LOW,\n").unwrap_err();
        match err {
            ImportError::FieldValueError { row, field, .. } => {
                assert_eq!(row, 2);
                assert_eq!(field, "meters_per_unit");
            }
            other => panic!("Expected FieldValueError, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_inconsistent_price() {
        let err = parse(
            "Katun,S,1.5,45000,20000,LOW,\n\
             Katun,M,2.0,55000,21000,LOW,\n",
        )
        .unwrap_err();
        assert!(matches!(err, ImportError::InconsistentMaterial { row: 3, .. }));
    }

    #[test]
    fn test_parse_rejects_duplicate_size() {
        let err = parse(
            "Katun,S,1.5,45000,20000,LOW,\n\
             Katun,S,1.6,45000,20000,LOW,\n",
        )
        .unwrap_err();
        assert!(matches!(err, ImportError::DuplicateSize { .. }));
    }

    #[test]
    fn test_parse_empty_and_malformed() {
        assert!(matches!(parse(""), Err(ImportError::EmptyFile)));
        assert!(matches!(
            parse("Katun,S,abc,45000,20000,LOW,\n"),
            Err(ImportError::CsvParseError { .. })
        ));
        assert!(matches!(
            parse("Katun,S,1.5,45000,20000,Stretchy,\n"),
            Err(ImportError::FieldValueError { .. })
        ));
    }
}
