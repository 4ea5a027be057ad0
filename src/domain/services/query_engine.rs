//! # Query Engine
//!
//! 実体化済みのエンティティ一覧に対するフィルタ・ソート・ページング
//!
//! Blobストレージの一覧APIはプレフィックス指定しかできないため、リポジトリは候補集合
//! （親プレフィックスで絞り込めればその範囲）をすべて実体化してからこのエンジンに渡す。
//! 処理量はバケット内のオブジェクト数に比例し、インデックスを追加しない限り
//! 中規模（数千件程度）を超えるとスケールしない。
//!
//! エンティティ固有の知識は `QuerySchema` の実装として与えられ、
//! エンジン自体はエンティティに依存しない。

use std::cmp::Ordering;

use crate::domain::entities::query::{
    CursorPage, PageRequest, PageResult, SortDirection, SortSpec, DEFAULT_PER_PAGE,
};
use crate::domain::entities::{BlobEntity, FileFilter};

/// フィルタ述語
pub type Predicate<E> = Box<dyn Fn(&E) -> bool + Send + Sync>;

/// 全ファイル系エンティティでソート可能なカラム
pub const COMMON_SORT_COLUMNS: &[&str] = &[
    "created_at",
    "updated_at",
    "file_name",
    "file_size",
    "mime_type",
];

/// エンティティごとのクエリ定義
pub trait QuerySchema {
    type Entity;
    type Filter;

    /// フィルタから述語のリストを作る（すべての述語のAND）
    fn predicates(&self, filter: &Self::Filter) -> Vec<Predicate<Self::Entity>>;

    /// ソート可能なカラムの許可リスト
    fn sortable_columns(&self) -> &[&'static str];

    /// 許可リスト内のカラムで比較する
    fn compare_column(&self, column: &str, a: &Self::Entity, b: &Self::Entity) -> Ordering;

    /// カラム未指定・許可リスト外のときの順序
    fn default_order(&self, a: &Self::Entity, b: &Self::Entity) -> Ordering;

    /// 一意なフィールドによる最終的なタイブレーク（昇順）
    fn tie_break(&self, a: &Self::Entity, b: &Self::Entity) -> Ordering;

    /// カーソルページング用の合成キー
    fn cursor_key(&self, entity: &Self::Entity) -> String;
}

/// クエリエンジン
pub struct QueryEngine<'a, Q: QuerySchema> {
    schema: &'a Q,
}

impl<'a, Q: QuerySchema> QueryEngine<'a, Q> {
    pub fn new(schema: &'a Q) -> Self {
        Self { schema }
    }

    /// フィルタを適用
    pub fn filter(&self, items: Vec<Q::Entity>, filter: &Q::Filter) -> Vec<Q::Entity> {
        let predicates = self.schema.predicates(filter);
        items
            .into_iter()
            .filter(|item| predicates.iter().all(|p| p(item)))
            .collect()
    }

    /// 件数を数える
    pub fn count(&self, items: &[Q::Entity], filter: &Q::Filter) -> usize {
        let predicates = self.schema.predicates(filter);
        items
            .iter()
            .filter(|item| predicates.iter().all(|p| p(item)))
            .count()
    }

    /// ソート（安定ソート、最後に必ずタイブレークを適用して全順序にする）
    pub fn sort(&self, items: &mut [Q::Entity], sort: Option<&SortSpec>) {
        let column = sort.filter(|s| {
            self.schema
                .sortable_columns()
                .contains(&s.column.as_str())
        });

        match column {
            Some(spec) => items.sort_by(|a, b| {
                let primary = self.schema.compare_column(&spec.column, a, b);
                let primary = match spec.direction {
                    SortDirection::Asc => primary,
                    SortDirection::Desc => primary.reverse(),
                };
                primary.then_with(|| self.schema.tie_break(a, b))
            }),
            None => items.sort_by(|a, b| {
                self.schema
                    .default_order(a, b)
                    .then_with(|| self.schema.tie_break(a, b))
            }),
        }
    }

    /// ページ指定で一覧を取得
    ///
    /// # Arguments
    ///
    /// * `items` - 実体化済みの候補集合
    /// * `filter` - フィルタ
    /// * `sort` - ソート条件（`None` はデフォルト順序）
    /// * `page` - ページ指定
    ///
    /// # Returns
    ///
    /// オフセットが総件数を超える場合は空のページ（総件数・総ページ数は保持）
    pub fn list(
        &self,
        items: Vec<Q::Entity>,
        filter: &Q::Filter,
        sort: Option<&SortSpec>,
        page: PageRequest,
    ) -> PageResult<Q::Entity> {
        let page = PageRequest::new(page.page, page.per_page);
        let mut matched = self.filter(items, filter);
        self.sort(&mut matched, sort);

        let total = matched.len();
        let offset = page.offset().min(total);
        let items: Vec<Q::Entity> = matched
            .into_iter()
            .skip(offset)
            .take(page.per_page)
            .collect();

        PageResult {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
            total_pages: total.div_ceil(page.per_page),
        }
    }

    /// カーソル指定で一覧を取得
    ///
    /// カーソルキーで並べ、`cursor` より厳密に後ろのキーから `limit + 1` 件を取り出す。
    /// 余分な1件が取れた場合のみ、返却する最後の要素のキーを `next_cursor` とする。
    ///
    /// # Arguments
    ///
    /// * `items` - 実体化済みの候補集合
    /// * `filter` - フィルタ
    /// * `direction` - カーソルキーの並び順
    /// * `cursor` - 前ページの `next_cursor`（空文字は未指定と同じ）
    /// * `limit` - 1ページの件数（0 は `DEFAULT_PER_PAGE`）
    pub fn list_by_cursor(
        &self,
        items: Vec<Q::Entity>,
        filter: &Q::Filter,
        direction: SortDirection,
        cursor: Option<&str>,
        limit: usize,
    ) -> CursorPage<Q::Entity> {
        let limit = if limit == 0 { DEFAULT_PER_PAGE } else { limit };
        let cursor = cursor.filter(|c| !c.is_empty());

        let mut keyed: Vec<(String, Q::Entity)> = self
            .filter(items, filter)
            .into_iter()
            .map(|item| (self.schema.cursor_key(&item), item))
            .collect();

        keyed.sort_by(|(ka, a), (kb, b)| {
            let primary = match direction {
                SortDirection::Asc => ka.cmp(kb),
                SortDirection::Desc => kb.cmp(ka),
            };
            primary.then_with(|| self.schema.tie_break(a, b))
        });

        let mut probe: Vec<(String, Q::Entity)> = keyed
            .into_iter()
            .filter(|(key, _)| match (cursor, direction) {
                (None, _) => true,
                (Some(c), SortDirection::Asc) => key.as_str() > c,
                (Some(c), SortDirection::Desc) => key.as_str() < c,
            })
            .take(limit + 1)
            .collect();

        let next_cursor = if probe.len() > limit {
            probe.truncate(limit);
            probe.last().map(|(key, _)| key.clone())
        } else {
            None
        };

        CursorPage {
            items: probe.into_iter().map(|(_, item)| item).collect(),
            next_cursor,
        }
    }
}

/// 大文字小文字を区別しない部分一致（`needle` 未設定は通過）
pub fn text_contains(haystack: &str, needle: Option<&str>) -> bool {
    match needle.map(str::trim).filter(|n| !n.is_empty()) {
        None => true,
        Some(n) => haystack.to_lowercase().contains(&n.to_lowercase()),
    }
}

/// IN条件（`set` 未設定は通過、空集合は何にも一致しない）
pub fn in_set<T: PartialEq>(value: &T, set: Option<&[T]>) -> bool {
    match set {
        None => true,
        Some(values) => values.contains(value),
    }
}

/// 両端を含む範囲条件
pub fn in_range<T: PartialOrd>(value: &T, min: Option<&T>, max: Option<&T>) -> bool {
    min.map_or(true, |m| value >= m) && max.map_or(true, |m| value <= m)
}

/// 値が未設定になりうるフィールドの範囲条件
///
/// 範囲が指定されていて値が未設定の場合は一致しない。
pub fn in_optional_range<T: PartialOrd>(
    value: Option<&T>,
    min: Option<&T>,
    max: Option<&T>,
) -> bool {
    match value {
        Some(v) => in_range(v, min, max),
        None => min.is_none() && max.is_none(),
    }
}

/// 論理削除の三値フラグ
pub fn deleted_matches(is_deleted: bool, flag: Option<bool>) -> bool {
    flag.map_or(true, |want| want == is_deleted)
}

/// 共通ファイルフィルタの述語を作る
pub fn file_predicates<E: BlobEntity + 'static>(filter: &FileFilter) -> Vec<Predicate<E>> {
    let mut predicates: Vec<Predicate<E>> = Vec::new();

    if let Some(name) = filter.file_name.clone() {
        predicates.push(Box::new(move |e: &E| {
            text_contains(&e.file().file_name, Some(name.as_str()))
        }));
    }
    if let Some(mime_types) = filter.mime_types.clone() {
        predicates.push(Box::new(move |e: &E| match &e.file().mime_type {
            Some(m) => in_set(m, Some(mime_types.as_slice())),
            None => false,
        }));
    }
    if filter.min_size.is_some() || filter.max_size.is_some() {
        let (min, max) = (filter.min_size, filter.max_size);
        predicates.push(Box::new(move |e: &E| {
            in_range(&e.file().file_size, min.as_ref(), max.as_ref())
        }));
    }
    if filter.created_from.is_some() || filter.created_to.is_some() {
        let (from, to) = (filter.created_from, filter.created_to);
        predicates.push(Box::new(move |e: &E| {
            in_optional_range(e.audit().created_at.as_ref(), from.as_ref(), to.as_ref())
        }));
    }
    if let Some(flag) = filter.deleted {
        predicates.push(Box::new(move |e: &E| {
            deleted_matches(e.audit().is_deleted(), Some(flag))
        }));
    }

    predicates
}

/// 共通カラムでの比較（`COMMON_SORT_COLUMNS` 以外は `None`）
pub fn compare_common<E: BlobEntity>(column: &str, a: &E, b: &E) -> Option<Ordering> {
    let ordering = match column {
        "created_at" => a.audit().created_at.cmp(&b.audit().created_at),
        "updated_at" => a.audit().updated_at.cmp(&b.audit().updated_at),
        "file_name" => a.file().file_name.cmp(&b.file().file_name),
        "file_size" => a.file().file_size.cmp(&b.file().file_size),
        "mime_type" => a.file().mime_type.cmp(&b.file().mime_type),
        _ => return None,
    };
    Some(ordering)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: &'static str,
        group: &'static str,
        name: &'static str,
        rank: i32,
        deleted: bool,
    }

    #[derive(Default)]
    struct RowFilter {
        name: Option<String>,
        groups: Option<Vec<&'static str>>,
        min_rank: Option<i32>,
        deleted: Option<bool>,
        reverse_predicates: bool,
    }

    struct RowSchema;

    impl QuerySchema for RowSchema {
        type Entity = Row;
        type Filter = RowFilter;

        fn predicates(&self, filter: &RowFilter) -> Vec<Predicate<Row>> {
            let name = filter.name.clone();
            let groups = filter.groups.clone();
            let min_rank = filter.min_rank;
            let deleted = filter.deleted;

            let mut predicates: Vec<Predicate<Row>> = vec![
                Box::new(move |r: &Row| text_contains(r.name, name.as_deref())),
                Box::new(move |r: &Row| in_set(&r.group, groups.as_deref())),
                Box::new(move |r: &Row| in_range(&r.rank, min_rank.as_ref(), None)),
                Box::new(move |r: &Row| deleted_matches(r.deleted, deleted)),
            ];
            if filter.reverse_predicates {
                predicates.reverse();
            }
            predicates
        }

        fn sortable_columns(&self) -> &[&'static str] {
            &["name", "rank"]
        }

        fn compare_column(&self, column: &str, a: &Row, b: &Row) -> Ordering {
            match column {
                "name" => a.name.cmp(b.name),
                _ => a.rank.cmp(&b.rank),
            }
        }

        fn default_order(&self, a: &Row, b: &Row) -> Ordering {
            b.rank.cmp(&a.rank)
        }

        fn tie_break(&self, a: &Row, b: &Row) -> Ordering {
            a.id.cmp(b.id)
        }

        fn cursor_key(&self, row: &Row) -> String {
            format!("{}|{}", row.group, row.name)
        }
    }

    fn row(id: &'static str, group: &'static str, name: &'static str, rank: i32) -> Row {
        Row {
            id,
            group,
            name,
            rank,
            deleted: false,
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            row("r1", "g1", "alpha", 1),
            row("r2", "g1", "beta", 3),
            row("r3", "g2", "gamma", 3),
            row("r4", "g2", "delta", 2),
            Row {
                deleted: true,
                ..row("r5", "g1", "epsilon", 5)
            },
        ]
    }

    fn ids(items: &[Row]) -> Vec<&'static str> {
        items.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_filter_unset_passes_everything() {
        let engine = QueryEngine::new(&RowSchema);
        let result = engine.filter(rows(), &RowFilter::default());
        assert_eq!(result.len(), 5);
    }

    #[test]
    fn test_filter_conjunction() {
        let engine = QueryEngine::new(&RowSchema);
        let filter = RowFilter {
            groups: Some(vec!["g1"]),
            deleted: Some(false),
            ..Default::default()
        };
        assert_eq!(ids(&engine.filter(rows(), &filter)), vec!["r1", "r2"]);
    }

    #[test]
    fn test_filter_order_independent() {
        let engine = QueryEngine::new(&RowSchema);
        let forward = RowFilter {
            name: Some("A".to_string()),
            min_rank: Some(2),
            ..Default::default()
        };
        let reversed = RowFilter {
            name: Some("A".to_string()),
            min_rank: Some(2),
            reverse_predicates: true,
            ..Default::default()
        };

        let a = engine.filter(rows(), &forward);
        let b = engine.filter(rows(), &reversed);
        assert_eq!(a, b);
        assert_eq!(ids(&a), vec!["r2", "r3", "r4"]);
    }

    #[test]
    fn test_empty_in_set_matches_nothing() {
        let engine = QueryEngine::new(&RowSchema);
        let filter = RowFilter {
            groups: Some(vec![]),
            ..Default::default()
        };
        assert!(engine.filter(rows(), &filter).is_empty());
    }

    #[test]
    fn test_sort_by_column_with_tie_break() {
        let engine = QueryEngine::new(&RowSchema);
        let mut items = rows();
        engine.sort(&mut items, Some(&SortSpec::new("rank", SortDirection::Desc)));

        // r2 と r3 は rank が同じなので id 昇順
        assert_eq!(ids(&items), vec!["r5", "r2", "r3", "r4", "r1"]);
    }

    #[test]
    fn test_sort_unknown_column_falls_back_to_default() {
        let engine = QueryEngine::new(&RowSchema);
        let mut unknown = rows();
        let mut default = rows();
        engine.sort(
            &mut unknown,
            Some(&SortSpec::new("drop table", SortDirection::Asc)),
        );
        engine.sort(&mut default, None);

        assert_eq!(unknown, default);
        assert_eq!(ids(&default), vec!["r5", "r2", "r3", "r4", "r1"]);
    }

    #[test]
    fn test_list_pagination() {
        let engine = QueryEngine::new(&RowSchema);
        let sort = SortSpec::new("name", SortDirection::Asc);

        let filter = RowFilter::default();
        let page1 = engine.list(rows(), &filter, Some(&sort), PageRequest::new(1, 2));
        assert_eq!(ids(&page1.items), vec!["r1", "r2"]);
        assert_eq!(page1.total, 5);
        assert_eq!(page1.total_pages, 3);

        let page3 = engine.list(rows(), &filter, Some(&sort), PageRequest::new(3, 2));
        assert_eq!(ids(&page3.items), vec!["r3"]);
    }

    #[test]
    fn test_list_offset_overrun_is_clamped() {
        let engine = QueryEngine::new(&RowSchema);
        let page = engine.list(rows(), &RowFilter::default(), None, PageRequest::new(10, 2));

        assert!(page.items.is_empty());
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 10);
    }

    #[test]
    fn test_list_empty_set() {
        let engine = QueryEngine::new(&RowSchema);
        let page = engine.list(vec![], &RowFilter::default(), None, PageRequest::default());
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_count() {
        let engine = QueryEngine::new(&RowSchema);
        let filter = RowFilter {
            deleted: Some(true),
            ..Default::default()
        };
        assert_eq!(engine.count(&rows(), &filter), 1);
        assert_eq!(engine.count(&rows(), &RowFilter::default()), 5);
    }

    #[test]
    fn test_cursor_walk_is_exhaustive_and_non_overlapping() {
        let engine = QueryEngine::new(&RowSchema);
        for limit in 1..=6 {
            let mut seen = Vec::new();
            let mut cursor: Option<String> = None;
            loop {
                let page = engine.list_by_cursor(
                    rows(),
                    &RowFilter::default(),
                    SortDirection::Asc,
                    cursor.as_deref(),
                    limit,
                );
                assert!(page.items.len() <= limit);
                seen.extend(page.items.iter().map(|r| r.id));
                match page.next_cursor {
                    Some(next) => cursor = Some(next),
                    None => break,
                }
            }
            assert_eq!(seen, vec!["r1", "r2", "r5", "r4", "r3"], "limit={}", limit);
        }
    }

    #[test]
    fn test_cursor_exact_fit_has_no_next_cursor() {
        let engine = QueryEngine::new(&RowSchema);
        let page =
            engine.list_by_cursor(rows(), &RowFilter::default(), SortDirection::Asc, None, 5);
        assert_eq!(page.items.len(), 5);
        assert!(page.next_cursor.is_none());

        let page =
            engine.list_by_cursor(rows(), &RowFilter::default(), SortDirection::Asc, None, 4);
        assert_eq!(page.items.len(), 4);
        assert_eq!(page.next_cursor.as_deref(), Some("g2|delta"));
    }

    #[test]
    fn test_cursor_descending() {
        let engine = QueryEngine::new(&RowSchema);
        let page = engine.list_by_cursor(
            rows(),
            &RowFilter::default(),
            SortDirection::Desc,
            Some("g2|delta"),
            2,
        );
        assert_eq!(ids(&page.items), vec!["r5", "r2"]);
        assert_eq!(page.next_cursor.as_deref(), Some("g1|beta"));
    }

    #[test]
    fn test_cursor_empty_token_starts_from_beginning() {
        let engine = QueryEngine::new(&RowSchema);
        let page = engine.list_by_cursor(
            rows(),
            &RowFilter::default(),
            SortDirection::Asc,
            Some(""),
            1,
        );
        assert_eq!(ids(&page.items), vec!["r1"]);
        assert_eq!(page.next_cursor.as_deref(), Some("g1|alpha"));
    }

    #[test]
    fn test_range_helpers() {
        assert!(in_range(&5, Some(&5), Some(&5)));
        assert!(!in_range(&4, Some(&5), None));
        assert!(in_optional_range::<i32>(None, None, None));
        assert!(!in_optional_range(None, Some(&1), None));
        assert!(deleted_matches(true, None));
        assert!(!deleted_matches(true, Some(false)));
        assert!(text_contains("Photo.PNG", Some("photo")));
        assert!(text_contains("anything", Some("  ")));
    }
}
