//! Pure board aggregation over a message and metadata snapshot.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use database::{ConversationMeta, StoredMessage};
use webhook_normalizer::{normalize_jid, number_from_jid};

use crate::model::{BoardColumn, BoardQuery, ChatSummary, GroupBy};

const UNTAGGED_KEY: &str = "_untagged";

/// Keys listed before the alphabetical rest.
const LEADING_KEYS: [&str; 3] = ["inbox", "p3", "hot"];

/// Latest message per conversation.
struct Snapshot {
    jid: String,
    text: Option<String>,
    ts: i64,
}

/// Reduce the log to one snapshot per canonical jid.
///
/// Messages are visited in insertion order and only a strictly newer
/// timestamp replaces the current snapshot, so ties keep the earliest row.
fn latest_per_conversation(messages: &[StoredMessage]) -> BTreeMap<String, Snapshot> {
    let mut ordered: Vec<&StoredMessage> = messages.iter().collect();
    ordered.sort_by_key(|m| m.id);

    let mut latest: BTreeMap<String, Snapshot> = BTreeMap::new();
    for msg in ordered {
        let Some(jid) = normalize_jid(&msg.jid) else {
            continue;
        };
        let newer = latest.get(&jid).map_or(true, |cur| msg.ts > cur.ts);
        if newer {
            latest.insert(
                jid.clone(),
                Snapshot {
                    jid,
                    text: msg.text.clone(),
                    ts: msg.ts,
                },
            );
        }
    }
    latest
}

fn summarize(snapshot: Snapshot, meta: Option<&ConversationMeta>) -> ChatSummary {
    let number = number_from_jid(&snapshot.jid);
    let defaults;
    let meta = match meta {
        Some(meta) => meta,
        None => {
            defaults = ConversationMeta::new(0, snapshot.jid.clone());
            &defaults
        }
    };

    let name = meta
        .title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| number.clone());
    let column = if meta.column_name.trim().is_empty() {
        "inbox".to_string()
    } else {
        meta.column_name.clone()
    };

    ChatSummary {
        jid: snapshot.jid,
        number,
        name,
        unread: 0,
        last_message_text: snapshot.text,
        last_message_at: snapshot.ts,
        column,
        priority: meta.priority,
        interest: meta.interest,
        color: meta.color.clone(),
        pinned: meta.pinned,
        archived: meta.archived,
        tags: meta.tags(),
        notes: meta.notes.clone(),
    }
}

fn matches_search(chat: &ChatSummary, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    let title = if chat.name == chat.number { "" } else { &chat.name };
    let haystack = format!("{} {} {}", chat.number, title, chat.tags.join(" ")).to_lowercase();
    haystack.contains(&term)
}

/// Pinned first, then unread, then most recent; jid breaks remaining ties.
fn board_order(a: &ChatSummary, b: &ChatSummary) -> Ordering {
    b.pinned
        .cmp(&a.pinned)
        .then_with(|| b.unread.cmp(&a.unread))
        .then_with(|| b.last_message_at.cmp(&a.last_message_at))
        .then_with(|| a.jid.cmp(&b.jid))
}

/// Priority bucket key and title.
pub fn priority_bucket(priority: i64) -> (&'static str, &'static str) {
    match priority {
        p if p >= 3 => ("p3", "Priority High"),
        2 => ("p2", "Priority Medium"),
        1 => ("p1", "Priority Low"),
        _ => ("p0", "No priority"),
    }
}

/// Interest bucket key and title.
pub fn interest_bucket(interest: i64) -> (&'static str, &'static str) {
    match interest {
        i if i >= 3 => ("hot", "Interest Hot"),
        2 => ("warm", "Interest Warm"),
        1 => ("cold", "Interest Cold"),
        _ => ("unknown", "No interest"),
    }
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Default)]
struct Buckets {
    columns: HashMap<String, BoardColumn>,
}

impl Buckets {
    fn push(&mut self, key: &str, title: impl FnOnce() -> String, color: Option<String>, chat: ChatSummary) {
        let column = self
            .columns
            .entry(key.to_string())
            .or_insert_with(|| BoardColumn {
                key: key.to_string(),
                title: title(),
                color,
                count: 0,
                chats: Vec::new(),
            });
        column.count += 1;
        column.chats.push(chat);
    }

    /// Leading keys first, the rest alphabetically.
    fn into_ordered(self) -> Vec<BoardColumn> {
        let mut columns: Vec<BoardColumn> = self.columns.into_values().collect();
        columns.sort_by(|a, b| {
            let rank = |k: &str| u8::from(!LEADING_KEYS.contains(&k));
            rank(&a.key).cmp(&rank(&b.key)).then_with(|| a.key.cmp(&b.key))
        });
        columns
    }
}

/// Build the board for one tenant snapshot.
///
/// Deterministic for a fixed snapshot: the same inputs always produce the
/// same ordered columns.
pub fn build_board(
    messages: &[StoredMessage],
    metas: &[ConversationMeta],
    query: &BoardQuery,
) -> Vec<BoardColumn> {
    let meta_by_jid: HashMap<String, &ConversationMeta> = metas
        .iter()
        .filter_map(|m| normalize_jid(&m.jid).map(|jid| (jid, m)))
        .collect();

    let mut chats: Vec<ChatSummary> = latest_per_conversation(messages)
        .into_values()
        .map(|snapshot| {
            let meta = meta_by_jid.get(&snapshot.jid).copied();
            summarize(snapshot, meta)
        })
        .filter(|chat| query.include_archived || !chat.archived)
        .filter(|chat| {
            query
                .search
                .as_deref()
                .map_or(true, |term| matches_search(chat, term))
        })
        .collect();

    chats.sort_by(board_order);
    chats.truncate(query.limit);

    let mut buckets = Buckets::default();
    match query.group_by {
        GroupBy::Column => {
            for chat in chats {
                let key = chat.column.clone();
                let color = chat.color.clone();
                buckets.push(&key, || capitalize(&key), color, chat);
            }
        }
        GroupBy::Priority => {
            for chat in chats {
                let (key, title) = priority_bucket(chat.priority);
                buckets.push(key, || title.to_string(), None, chat);
            }
        }
        GroupBy::Interest => {
            for chat in chats {
                let (key, title) = interest_bucket(chat.interest);
                buckets.push(key, || title.to_string(), None, chat);
            }
        }
        GroupBy::Tag => {
            for chat in chats {
                if chat.tags.is_empty() {
                    buckets.push(UNTAGGED_KEY, || "Untagged".to_string(), None, chat);
                    continue;
                }
                for tag in &chat.tags {
                    let key = format!("tag:{tag}");
                    buckets.push(&key, || format!("#{tag}"), None, chat.clone());
                }
            }
        }
    }

    buckets.into_ordered()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: i64, jid: &str, text: &str, ts: i64) -> StoredMessage {
        StoredMessage {
            id,
            tenant_id: 1,
            instance: "brand_1".into(),
            jid: jid.into(),
            from_me: false,
            text: Some(text.into()),
            ts,
            agent: None,
            raw_json: "{}".into(),
            created_at: String::new(),
        }
    }

    fn meta(jid: &str) -> ConversationMeta {
        ConversationMeta::new(1, jid)
    }

    fn keys(columns: &[BoardColumn]) -> Vec<&str> {
        columns.iter().map(|c| c.key.as_str()).collect()
    }

    #[test]
    fn test_conversations_without_meta_land_in_inbox() {
        let messages = vec![msg(1, "111@s.whatsapp.net", "a", 10), msg(2, "222", "b", 20)];
        let board = build_board(&messages, &[], &BoardQuery::default());

        assert_eq!(keys(&board), vec!["inbox"]);
        assert_eq!(board[0].count, 2);
        assert_eq!(board[0].chats[0].number, "222");
        assert_eq!(board[0].chats[0].name, "222");
    }

    #[test]
    fn test_latest_message_wins_and_ties_keep_first() {
        let messages = vec![
            msg(1, "111@s.whatsapp.net", "first", 10),
            msg(2, "111@s.whatsapp.net", "tie", 10),
            msg(3, "111:3@s.whatsapp.net", "newest", 30),
            msg(4, "111@s.whatsapp.net", "late arrival, old ts", 5),
        ];
        let board = build_board(&messages, &[], &BoardQuery::default());
        let chat = &board[0].chats[0];
        assert_eq!(chat.last_message_text.as_deref(), Some("newest"));
        assert_eq!(chat.last_message_at, 30);

        let tie = build_board(&messages[..2], &[], &BoardQuery::default());
        assert_eq!(tie[0].chats[0].last_message_text.as_deref(), Some("first"));
    }

    #[test]
    fn test_pinned_sorts_first() {
        let messages = vec![msg(1, "111", "old", 10), msg(2, "222", "new", 99)];
        let mut pinned = meta("111@s.whatsapp.net");
        pinned.pinned = true;

        let board = build_board(&messages, &[pinned], &BoardQuery::default());
        let order: Vec<_> = board[0].chats.iter().map(|c| c.number.as_str()).collect();
        assert_eq!(order, vec!["111", "222"]);
    }

    #[test]
    fn test_pinned_beats_unread() {
        let mut unread = summarize(
            Snapshot { jid: "1@s.whatsapp.net".into(), text: None, ts: 50 },
            None,
        );
        unread.unread = 5;
        let mut pinned = summarize(
            Snapshot { jid: "2@s.whatsapp.net".into(), text: None, ts: 1 },
            None,
        );
        pinned.pinned = true;

        let mut chats = vec![unread, pinned];
        chats.sort_by(board_order);
        assert!(chats[0].pinned);
    }

    #[test]
    fn test_archived_and_search_filters() {
        let messages = vec![
            msg(1, "111", "a", 1),
            msg(2, "222", "b", 2),
            msg(3, "333", "c", 3),
        ];
        let mut archived = meta("111@s.whatsapp.net");
        archived.archived = true;
        let mut vip = meta("222@s.whatsapp.net");
        vip.title = Some("Maria Lopez".into());
        vip.tags_json = r#"["vip"]"#.into();
        let metas = vec![archived, vip];

        let board = build_board(&messages, &metas, &BoardQuery::default());
        assert_eq!(board[0].count, 2);

        let all = build_board(
            &messages,
            &metas,
            &BoardQuery { include_archived: true, ..Default::default() },
        );
        assert_eq!(all[0].count, 3);

        for term in ["maria", "VIP", "222"] {
            let found = build_board(
                &messages,
                &metas,
                &BoardQuery { search: Some(term.into()), ..Default::default() },
            );
            assert_eq!(found[0].count, 1, "term {term}");
            assert_eq!(found[0].chats[0].name, "Maria Lopez");
        }
    }

    #[test]
    fn test_priority_and_interest_buckets() {
        let messages = vec![msg(1, "111", "a", 1), msg(2, "222", "b", 2), msg(3, "333", "c", 3)];
        let mut high = meta("111@s.whatsapp.net");
        high.priority = 3;
        high.interest = 3;
        let mut low = meta("222@s.whatsapp.net");
        low.priority = 1;
        low.interest = 2;

        let by_priority = build_board(
            &messages,
            &[high.clone(), low.clone()],
            &BoardQuery { group_by: GroupBy::Priority, ..Default::default() },
        );
        assert_eq!(keys(&by_priority), vec!["p3", "p0", "p1"]);

        let by_interest = build_board(
            &messages,
            &[high, low],
            &BoardQuery { group_by: GroupBy::Interest, ..Default::default() },
        );
        assert_eq!(keys(&by_interest), vec!["hot", "unknown", "warm"]);
    }

    #[test]
    fn test_tag_grouping_replicates_chats() {
        let messages = vec![msg(1, "111", "a", 1), msg(2, "222", "b", 2)];
        let mut tagged = meta("111@s.whatsapp.net");
        tagged.tags_json = r#"["lead","vip"]"#.into();

        let board = build_board(
            &messages,
            &[tagged],
            &BoardQuery { group_by: GroupBy::Tag, ..Default::default() },
        );
        assert_eq!(keys(&board), vec!["_untagged", "tag:lead", "tag:vip"]);
        assert_eq!(board[1].title, "#lead");
        assert_eq!(board[1].chats[0].number, "111");
        assert_eq!(board[2].chats[0].number, "111");
    }

    #[test]
    fn test_column_order_and_color() {
        let messages = vec![msg(1, "111", "a", 1), msg(2, "222", "b", 2), msg(3, "333", "c", 3)];
        let mut done = meta("111@s.whatsapp.net");
        done.column_name = "done".into();
        done.color = Some("#00ff00".into());
        let mut active = meta("222@s.whatsapp.net");
        active.column_name = "active".into();

        let board = build_board(&messages, &[done, active], &BoardQuery::default());
        assert_eq!(keys(&board), vec!["inbox", "active", "done"]);
        assert_eq!(board[2].title, "Done");
        assert_eq!(board[2].color.as_deref(), Some("#00ff00"));
    }

    #[test]
    fn test_build_is_deterministic() {
        let messages: Vec<_> = (0..20)
            .map(|i| msg(i, &format!("{}", 100 + i % 7), "x", i % 3))
            .collect();
        let mut tagged = meta("101@s.whatsapp.net");
        tagged.tags_json = r#"["b","a"]"#.into();
        let metas = vec![tagged];

        for group_by in [GroupBy::Column, GroupBy::Priority, GroupBy::Interest, GroupBy::Tag] {
            let query = BoardQuery { group_by, ..Default::default() };
            assert_eq!(
                build_board(&messages, &metas, &query),
                build_board(&messages, &metas, &query)
            );
        }
    }

    #[test]
    fn test_limit_truncates_after_sort() {
        let messages = vec![msg(1, "111", "a", 1), msg(2, "222", "b", 2)];
        let board = build_board(
            &messages,
            &[],
            &BoardQuery { limit: 1, ..Default::default() },
        );
        assert_eq!(board[0].chats.len(), 1);
        assert_eq!(board[0].chats[0].number, "222");
    }
}
