// ==========================================
// 瓦楞纸箱生产运营看板 - 生产步骤实体
// ==========================================
// 职责:
// 1. 标准工序分类 + 别名表（全系统唯一一份）
// 2. 步骤实体：原始状态 / stepDetails / 工序子对象
// 说明: 后端返回的是"可选字段袋"，这里在反序列化时就收敛为带类型的结构
// ==========================================

use crate::domain::types::{DetailStatus, StepStatus};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// ==========================================
// 标准工序分类 (Canonical Step Category)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StepCategory {
    PaperStore,
    PrintingDetails,
    Corrugation,
    FluteLaminateBoardConversion,
    Punching,
    SideFlapPasting,
    QualityDept,
    DispatchProcess,
}

impl StepCategory {
    /// 按生产顺序排列的全部工序
    pub const ALL: [StepCategory; 8] = [
        StepCategory::PaperStore,
        StepCategory::PrintingDetails,
        StepCategory::Corrugation,
        StepCategory::FluteLaminateBoardConversion,
        StepCategory::Punching,
        StepCategory::SideFlapPasting,
        StepCategory::QualityDept,
        StepCategory::DispatchProcess,
    ];

    /// 标准步骤名（合并后的主键）
    pub fn canonical_name(&self) -> &'static str {
        match self {
            StepCategory::PaperStore => "PaperStore",
            StepCategory::PrintingDetails => "PrintingDetails",
            StepCategory::Corrugation => "Corrugation",
            StepCategory::FluteLaminateBoardConversion => "FluteLaminateBoardConversion",
            StepCategory::Punching => "Punching",
            StepCategory::SideFlapPasting => "SideFlapPasting",
            StepCategory::QualityDept => "QualityDept",
            StepCategory::DispatchProcess => "DispatchProcess",
        }
    }

    /// 历史别名
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            StepCategory::PaperStore => &["Paper Store"],
            StepCategory::PrintingDetails => &["Printing"],
            StepCategory::Corrugation => &[],
            StepCategory::FluteLaminateBoardConversion => &["Flute Lamination"],
            StepCategory::Punching => &[],
            StepCategory::SideFlapPasting => &["Flap Pasting"],
            StepCategory::QualityDept => &["Quality Control"],
            StepCategory::DispatchProcess => &["Dispatch"],
        }
    }

    /// 工序子对象 / allStepDetails 台账中使用的字段名
    pub fn record_keys(&self) -> &'static [&'static str] {
        match self {
            StepCategory::PaperStore => &["paperStore"],
            StepCategory::PrintingDetails => &["printingDetails"],
            StepCategory::Corrugation => &["corrugation"],
            StepCategory::FluteLaminateBoardConversion => {
                &["flutelam", "fluteLaminateBoardConversion"]
            }
            StepCategory::Punching => &["punching"],
            StepCategory::SideFlapPasting => &["sideFlapPasting"],
            StepCategory::QualityDept => &["qualityDept"],
            StepCategory::DispatchProcess => &["dispatchProcess"],
        }
    }

    /// 步骤名 → 工序（标准名或别名均可，首尾空白忽略）
    pub fn from_step_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.canonical_name() == name || c.aliases().contains(&name))
    }

    /// 子对象 / 台账字段名 → 工序
    pub fn from_record_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.record_keys().contains(&key))
    }
}

impl fmt::Display for StepCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

// ==========================================
// stepDetails（按需拉取的实测明细）
// ==========================================
// 后端写入的明细形状并不稳定：非对象的 data、非字符串的 status 都按缺失处理，
// 单条坏记录只会让该步骤走向默认的 planned，不会拖垮整批数据
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDetails {
    pub status: Option<DetailStatus>,
    pub data: Option<StepDetailData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDetailData {
    pub status: Option<DetailStatus>,
    pub major_hold_remark: Option<String>,
    pub hold_remark: Option<String>,
    /// 数量、操作工等其余实测字段原样保留
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StepDetails {
    pub fn data_status(&self) -> Option<DetailStatus> {
        self.data.as_ref().and_then(|d| d.status)
    }

    /// 从原始 JSON 构建；非对象返回 None
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(Self {
            status: object.get("status").and_then(detail_status_from_value),
            data: object.get("data").and_then(StepDetailData::from_value),
        })
    }
}

impl StepDetailData {
    /// 从原始 JSON 构建；非对象返回 None
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);

        let extra = object
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), "status" | "majorHoldRemark" | "holdRemark"))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Some(Self {
            status: object.get("status").and_then(detail_status_from_value),
            major_hold_remark: text("majorHoldRemark"),
            hold_remark: text("holdRemark"),
            extra,
        })
    }
}

impl<'de> Deserialize<'de> for StepDetails {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        StepDetails::from_value(&value)
            .ok_or_else(|| serde::de::Error::custom("stepDetails 必须是对象"))
    }
}

/// 字符串状态按枚举解析（未知值为 Other），其余类型视为缺失
fn detail_status_from_value(value: &Value) -> Option<DetailStatus> {
    value
        .as_str()
        .and_then(|_| serde_json::from_value::<DetailStatus>(value.clone()).ok())
}

// ==========================================
// 工序子对象 (Step Type Detail)
// ==========================================
// paperStore / printingDetails / corrugation / flutelam ... 统一收敛为
// { category, status, fields }，新增工序只需扩展 StepCategory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepTypeDetail {
    pub category: StepCategory,
    pub status: Option<DetailStatus>,
    pub fields: Map<String, Value>,
}

impl StepTypeDetail {
    /// 从原始 JSON 构建
    ///
    /// 后端有时返回对象，有时返回只含一条记录的数组；都取第一条对象。
    /// 非对象值返回 None。
    pub fn from_value(category: StepCategory, value: &Value) -> Option<Self> {
        let object = match value {
            Value::Object(map) => map,
            Value::Array(items) => items.iter().find_map(Value::as_object)?,
            _ => return None,
        };

        let status = object.get("status").and_then(detail_status_from_value);

        Some(Self {
            category,
            status,
            fields: object.clone(),
        })
    }
}

// ==========================================
// Step - 生产步骤
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawStep", into = "RawStep")]
pub struct Step {
    pub id: Option<i64>,
    pub step_no: Option<i32>,
    pub step_name: String,
    pub status: StepStatus,
    pub step_details: Option<StepDetails>,
    pub type_details: Vec<StepTypeDetail>,
    pub user: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Step {
    /// 创建只有名称和原始状态的步骤
    pub fn new(step_name: &str, status: StepStatus) -> Self {
        Self {
            id: None,
            step_no: None,
            step_name: step_name.to_string(),
            status,
            step_details: None,
            type_details: Vec::new(),
            user: None,
            start_date: None,
            end_date: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// 所属标准工序（未知步骤返回 None）
    pub fn category(&self) -> Option<StepCategory> {
        StepCategory::from_step_name(&self.step_name)
    }

    /// 指定工序的子对象
    pub fn type_detail(&self, category: StepCategory) -> Option<&StepTypeDetail> {
        self.type_details.iter().find(|d| d.category == category)
    }

    /// 是否需要按需拉取 stepDetails（仅 start/stop 且尚未携带明细）
    pub fn needs_detail_lookup(&self) -> bool {
        matches!(self.status, StepStatus::Start | StepStatus::Stop) && self.step_details.is_none()
    }
}

// ==========================================
// RawStep - 后端原始形状（仅用于序列化边界）
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    step_no: Option<i32>,
    #[serde(default)]
    step_name: String,
    #[serde(default, deserialize_with = "lenient_step_status")]
    status: StepStatus,
    #[serde(
        default,
        deserialize_with = "lenient_step_details",
        skip_serializing_if = "Option::is_none"
    )]
    step_details: Option<StepDetails>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    user: Option<String>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    paper_store: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    printing_details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    corrugation: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    flutelam: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    flute_laminate_board_conversion: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    punching: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    side_flap_pasting: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    quality_dept: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dispatch_process: Option<Value>,
}

impl From<RawStep> for Step {
    fn from(raw: RawStep) -> Self {
        let candidates = [
            (StepCategory::PaperStore, raw.paper_store.as_ref()),
            (StepCategory::PrintingDetails, raw.printing_details.as_ref()),
            (StepCategory::Corrugation, raw.corrugation.as_ref()),
            (StepCategory::FluteLaminateBoardConversion, raw.flutelam.as_ref()),
            (
                StepCategory::FluteLaminateBoardConversion,
                raw.flute_laminate_board_conversion.as_ref(),
            ),
            (StepCategory::Punching, raw.punching.as_ref()),
            (StepCategory::SideFlapPasting, raw.side_flap_pasting.as_ref()),
            (StepCategory::QualityDept, raw.quality_dept.as_ref()),
            (StepCategory::DispatchProcess, raw.dispatch_process.as_ref()),
        ];

        let mut type_details: Vec<StepTypeDetail> = Vec::new();
        for (category, value) in candidates {
            let Some(detail) = value.and_then(|v| StepTypeDetail::from_value(category, v)) else {
                continue;
            };
            // flutelam 与 fluteLaminateBoardConversion 同时存在时保留前者
            if type_details.iter().any(|d| d.category == category) {
                continue;
            }
            type_details.push(detail);
        }

        Step {
            id: raw.id,
            step_no: raw.step_no,
            step_name: raw.step_name,
            status: raw.status,
            step_details: raw.step_details,
            type_details,
            user: raw.user.filter(|u| !u.trim().is_empty()),
            start_date: raw.start_date,
            end_date: raw.end_date,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        }
    }
}

impl From<Step> for RawStep {
    fn from(step: Step) -> Self {
        let mut raw = RawStep {
            id: step.id,
            step_no: step.step_no,
            step_name: step.step_name,
            status: step.status,
            step_details: step.step_details,
            user: step.user,
            start_date: step.start_date,
            end_date: step.end_date,
            created_at: step.created_at,
            updated_at: step.updated_at,
            ..RawStep::default()
        };

        for detail in step.type_details {
            let value = Some(Value::Object(detail.fields));
            match detail.category {
                StepCategory::PaperStore => raw.paper_store = value,
                StepCategory::PrintingDetails => raw.printing_details = value,
                StepCategory::Corrugation => raw.corrugation = value,
                StepCategory::FluteLaminateBoardConversion => raw.flutelam = value,
                StepCategory::Punching => raw.punching = value,
                StepCategory::SideFlapPasting => raw.side_flap_pasting = value,
                StepCategory::QualityDept => raw.quality_dept = value,
                StepCategory::DispatchProcess => raw.dispatch_process = value,
            }
        }

        raw
    }
}

/// 原始状态为 null / 非字符串时：null 视为 planned，其他类型为 Unknown
fn lenient_step_status<'de, D>(deserializer: D) -> Result<StepStatus, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => StepStatus::Planned,
        Some(value @ Value::String(_)) => {
            serde_json::from_value(value).unwrap_or(StepStatus::Unknown)
        }
        Some(_) => StepStatus::Unknown,
    })
}

/// stepDetails 不是对象时按缺失处理
fn lenient_step_details<'de, D>(deserializer: D) -> Result<Option<StepDetails>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(StepDetails::from_value))
}

/// 字符串或数字都接受（operator id 在不同接口里类型不一）
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
