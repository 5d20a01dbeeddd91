//! 計算過程中的問題記錄

use serde::{Deserialize, Serialize};

use crate::MrpError;

/// 問題類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IssueKind {
    CyclicBom,
    BomDepthExceeded,
    MissingVendorData,
    MissingInventoryPosition,
    StaleInventorySnapshot,
    LowForecastConfidence,
    InvalidLeadTime,
}

/// 嚴重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueSeverity {
    Info,
    Warning,
    Error,
}

/// 單筆問題（跳過或標記的物料都會留下記錄）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanIssue {
    pub kind: IssueKind,
    /// 受影響的 SKU（快照層級的問題為 None）
    pub sku: Option<String>,
    pub message: String,
    pub severity: IssueSeverity,
}

impl PlanIssue {
    pub fn new(
        kind: IssueKind,
        sku: Option<String>,
        message: String,
        severity: IssueSeverity,
    ) -> Self {
        Self {
            kind,
            sku,
            message,
            severity,
        }
    }

    pub fn warning(kind: IssueKind, sku: impl Into<String>, message: String) -> Self {
        Self::new(kind, Some(sku.into()), message, IssueSeverity::Warning)
    }

    pub fn error(kind: IssueKind, sku: impl Into<String>, message: String) -> Self {
        Self::new(kind, Some(sku.into()), message, IssueSeverity::Error)
    }

    /// 從單一成品的展開錯誤建立問題記錄
    ///
    /// 只有隔離型錯誤（循環、層級過深）會轉換，其他錯誤回傳 None。
    pub fn from_isolated_error(sku: &str, err: &MrpError) -> Option<Self> {
        let kind = match err {
            MrpError::CyclicBom { .. } => IssueKind::CyclicBom,
            MrpError::BomDepthExceeded { .. } => IssueKind::BomDepthExceeded,
            _ => return None,
        };
        Some(Self::error(kind, sku, err.to_string()))
    }

    pub fn is_error(&self) -> bool {
        self.severity == IssueSeverity::Error
    }
}
