use chrono::{DateTime, Utc};

/// 发布选项：逐项覆盖事件字段
///
/// 各选项作用于互不相交的字段，因此先后顺序无关；同一字段重复设置时后者生效。
/// 字符串为空视为未设置，回落到上下文或生成器。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitOption {
    Id(String),
    TxId(String),
    Source(String),
    OccurredAt(DateTime<Utc>),
}

impl EmitOption {
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    pub fn tx_id(tx_id: impl Into<String>) -> Self {
        Self::TxId(tx_id.into())
    }

    pub fn source(source: impl Into<String>) -> Self {
        Self::Source(source.into())
    }

    pub fn occurred_at(at: DateTime<Utc>) -> Self {
        Self::OccurredAt(at)
    }
}

/// 应用选项后的事件草稿，`None` 的字段由分发器补全
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct EventDraft {
    pub(crate) id: Option<String>,
    pub(crate) tx_id: Option<String>,
    pub(crate) source: Option<String>,
    pub(crate) occurred_at: Option<DateTime<Utc>>,
}

impl EventDraft {
    pub(crate) fn from_options<I>(options: I) -> Self
    where
        I: IntoIterator<Item = EmitOption>,
    {
        options.into_iter().fold(Self::default(), |mut draft, opt| {
            draft.apply(opt);
            draft
        })
    }

    pub(crate) fn apply(&mut self, option: EmitOption) {
        match option {
            EmitOption::Id(v) => self.id = non_empty(v),
            EmitOption::TxId(v) => self.tx_id = non_empty(v),
            EmitOption::Source(v) => self.source = non_empty(v),
            EmitOption::OccurredAt(at) => self.occurred_at = Some(at),
        }
    }
}

fn non_empty(v: String) -> Option<String> {
    (!v.is_empty()).then_some(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn options_set_disjoint_fields_in_any_order() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let a = EventDraft::from_options([
            EmitOption::id("e-1"),
            EmitOption::tx_id("tx-1"),
            EmitOption::source("svc"),
            EmitOption::occurred_at(at),
        ]);
        let b = EventDraft::from_options([
            EmitOption::occurred_at(at),
            EmitOption::source("svc"),
            EmitOption::tx_id("tx-1"),
            EmitOption::id("e-1"),
        ]);

        assert_eq!(a, b);
        assert_eq!(a.id.as_deref(), Some("e-1"));
        assert_eq!(a.occurred_at, Some(at));
    }

    #[test]
    fn last_write_wins() {
        let options = [EmitOption::tx_id("first"), EmitOption::tx_id("second")];
        let draft = EventDraft::from_options(options);
        assert_eq!(draft.tx_id.as_deref(), Some("second"));
    }

    #[test]
    fn empty_strings_are_unset() {
        let draft = EventDraft::from_options([
            EmitOption::id("e-1"),
            EmitOption::id(""),
            EmitOption::tx_id(""),
            EmitOption::source(""),
        ]);
        assert_eq!(draft, EventDraft::default());
    }
}
