//! # Query Value Objects
//!
//! 一覧取得・カーソルページングの条件と結果

use serde::Serialize;

/// 1ページあたりのデフォルト件数
pub const DEFAULT_PER_PAGE: usize = 20;

/// ソート方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// ソート条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// ソート対象カラム（許可リスト外はデフォルト順序にフォールバック）
    pub column: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }
}

/// ページ指定（1始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub per_page: usize,
}

impl PageRequest {
    /// ページ指定を作成
    ///
    /// `page` が0の場合は1、`per_page` が0の場合は `DEFAULT_PER_PAGE` に正規化する。
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page: page.max(1),
            per_page: if per_page == 0 {
                DEFAULT_PER_PAGE
            } else {
                per_page
            },
        }
    }

    /// 先頭からのオフセット `(page - 1) * per_page`
    #[inline]
    pub fn offset(&self) -> usize {
        (self.page.max(1) - 1).saturating_mul(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PER_PAGE)
    }
}

/// ページ指定の一覧条件
#[derive(Debug, Clone, Default)]
pub struct ListQuery<F> {
    pub filter: F,
    pub sort: Option<SortSpec>,
    pub page: PageRequest,
}

/// カーソル指定の一覧条件
#[derive(Debug, Clone, Default)]
pub struct CursorQuery<F> {
    pub filter: F,
    /// カーソルキーの並び順
    pub direction: SortDirection,
    /// 前ページが返した不透明なカーソル（このキーの「直後」から再開する）
    pub cursor: Option<String>,
    /// 0 の場合は `DEFAULT_PER_PAGE`
    pub limit: usize,
}

/// ページ指定の一覧結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

/// カーソル指定の一覧結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CursorPage<T> {
    pub items: Vec<T>,
    /// 続きがない場合は `None`
    pub next_cursor: Option<String>,
}
