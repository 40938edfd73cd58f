//! Keyword-driven answers over the fan dataset.
//!
//! A question is lowercased and checked against an ordered rule table. The
//! first rule whose keywords all appear wins and renders a fixed report;
//! anything else gets [`HELP_TEXT`]. Rule order matters because keyword sets
//! overlap ("average spend by community" never reaches the community spend
//! rule, for example).

use std::collections::HashMap;

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};
use tracing::debug;
use utils::text::{format_number, to_fixed};

use super::fan_data::FanRecord;

pub const HELP_TEXT: &str = "I'm not sure how to answer that question about the OTT fan movement data. You can ask about:\n\n\
• Popular streaming services overall or for a specific league (NBA, NFL, etc.)\n\
• Spending by community or average spend for a specific league\n\
• Fan counts by community or for a specific league\n\
• Net change in streaming subscriptions\n\
• Comparison of top streaming services";

const NO_MERCHANT: &str = "_none_";
const UNKNOWN_COMMUNITY: &str = "Unknown";
const TOP_N: usize = 5;

/// Leagues recognised in a question. WNBA comes before NBA so that "wnba"
/// is not read as NBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum League {
    Wnba,
    Nba,
    Nfl,
    Nhl,
    Mlb,
    Mls,
    Nwsl,
}

impl League {
    fn keyword(&self) -> &'static str {
        match self {
            League::Wnba => "wnba",
            League::Nba => "nba",
            League::Nfl => "nfl",
            League::Nhl => "nhl",
            League::Mlb => "mlb",
            League::Mls => "mls",
            League::Nwsl => "nwsl",
        }
    }

    /// The first league whose keyword appears in an already-lowercased question.
    pub fn find_in(text: &str) -> Option<League> {
        League::iter().find(|league| text.contains(league.keyword()))
    }
}

/// A lowercased question and the league it mentions, if any.
#[derive(Debug, Clone)]
pub struct FanQuery {
    text: String,
    league: Option<League>,
}

impl FanQuery {
    pub fn parse(query: &str) -> Self {
        let text = query.to_lowercase();
        let league = League::find_in(&text);
        Self { text, league }
    }

    pub fn league(&self) -> Option<League> {
        self.league
    }

    fn has(&self, keyword: &str) -> bool {
        self.text.contains(keyword)
    }

    fn has_all(&self, keywords: &[&str]) -> bool {
        keywords.iter().all(|k| self.has(k))
    }

    fn has_any(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|k| self.has(k))
    }
}

struct Rule {
    name: &'static str,
    matches: fn(&FanQuery) -> bool,
    answer: fn(&FanQuery, &[FanRecord]) -> String,
}

const RULES: &[Rule] = &[
    Rule {
        name: "popular_streaming_overall",
        matches: |q: &FanQuery| q.has_all(&["popular", "streaming"]) && q.league.is_none(),
        answer: popular_streaming_overall,
    },
    Rule {
        name: "spend_by_community",
        matches: |q: &FanQuery| q.has_all(&["spend", "community"]) && !q.has("average"),
        answer: spend_by_community,
    },
    Rule {
        name: "top_community",
        matches: |q: &FanQuery| q.has_any(&["which", "what"]) && q.has_all(&["community", "most"]),
        answer: top_community,
    },
    Rule {
        name: "fans_by_community",
        matches: |q: &FanQuery| {
            q.has_all(&["fans", "each community"]) || q.has_all(&["how many", "fans", "community"])
        },
        answer: fans_by_community,
    },
    Rule {
        name: "league_fan_count",
        matches: |q: &FanQuery| q.league.is_some() && q.has_any(&["how many", "number of", "count"]),
        answer: league_fan_count,
    },
    Rule {
        name: "league_popular_streaming",
        matches: |q: &FanQuery| q.league.is_some() && q.has_all(&["popular", "streaming"]),
        answer: league_popular_streaming,
    },
    Rule {
        name: "league_average_spend",
        matches: |q: &FanQuery| q.league.is_some() && q.has_all(&["average", "spend"]),
        answer: league_average_spend,
    },
    Rule {
        name: "net_change",
        matches: |q: &FanQuery| q.has("net change") || q.has_all(&["wins", "losses"]),
        answer: net_change,
    },
    Rule {
        name: "compare_streaming",
        matches: |q: &FanQuery| q.has_all(&["compare", "streaming"]),
        answer: compare_streaming,
    },
];

/// Name of the rule a question dispatches to, or `None` for the help text.
pub fn matched_rule(query: &str) -> Option<&'static str> {
    let query = FanQuery::parse(query);
    RULES
        .iter()
        .find(|rule| (rule.matches)(&query))
        .map(|rule| rule.name)
}

/// Answer a free-text question about the fan table.
pub fn answer(query: &str, records: &[FanRecord]) -> String {
    let query = FanQuery::parse(query);

    match RULES.iter().find(|rule| (rule.matches)(&query)) {
        Some(rule) => {
            debug!(rule = rule.name, league = ?query.league, "Matched fan query rule");
            (rule.answer)(&query, records)
        }
        None => {
            debug!("No fan query rule matched");
            HELP_TEXT.to_string()
        }
    }
}

/// Display form of a merchant code: `espn_plus` becomes `Espn Plus`.
pub fn format_merchant_name(merchant: Option<&str>) -> String {
    let merchant = match merchant {
        Some(m) if !m.is_empty() && m != NO_MERCHANT => m,
        _ => return "None".to_string(),
    };

    merchant
        .replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn percent(part: usize, whole: usize) -> String {
    if whole == 0 {
        return to_fixed(0.0, 1);
    }
    to_fixed(part as f64 / whole as f64 * 100.0, 1)
}

fn community_of(record: &FanRecord) -> &str {
    match record.community.as_deref() {
        Some(c) if !c.is_empty() => c,
        _ => UNKNOWN_COMMUNITY,
    }
}

fn streaming_merchant(record: &FanRecord) -> Option<&str> {
    record
        .primary_merchant
        .as_deref()
        .filter(|m| !m.is_empty() && *m != NO_MERCHANT)
}

/// Count keys, largest first. Ties keep the order keys were first seen in.
fn ranked_counts<'a>(keys: impl IntoIterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<(&'a str, usize)> = Vec::new();

    for key in keys {
        match index.get(key) {
            Some(&idx) => counts[idx].1 += 1,
            None => {
                index.insert(key, counts.len());
                counts.push((key, 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

fn league_records(records: &[FanRecord], league: League) -> Vec<&FanRecord> {
    let name = league.to_string();
    records.iter().filter(|r| r.in_community(&name)).collect()
}

fn popular_streaming_overall(_query: &FanQuery, records: &[FanRecord]) -> String {
    let ranked = ranked_counts(records.iter().filter_map(streaming_merchant));

    let mut response =
        String::from("The most popular streaming services among all sports fans are:\n");
    for (idx, (merchant, count)) in ranked.iter().take(TOP_N).enumerate() {
        response.push_str(&format!(
            "{}. {}: {} fans ({}%)\n",
            idx + 1,
            format_merchant_name(Some(*merchant)),
            count,
            percent(*count, records.len())
        ));
    }
    response
}

fn spend_by_community(_query: &FanQuery, records: &[FanRecord]) -> String {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(&str, f64)> = Vec::new();

    for record in records {
        let Some(community) = record.community.as_deref().filter(|c| !c.is_empty()) else {
            continue;
        };
        match index.get(community) {
            Some(&idx) => totals[idx].1 += record.total_spend(),
            None => {
                index.insert(community, totals.len());
                totals.push((community, record.total_spend()));
            }
        }
    }

    totals.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut response = String::from("Total streaming spend by sports community:\n");
    for (community, spend) in totals {
        response.push_str(&format!("{}: ${}\n", community, to_fixed(spend, 2)));
    }
    response
}

fn top_community(_query: &FanQuery, records: &[FanRecord]) -> String {
    let ranked = ranked_counts(records.iter().map(community_of));

    match ranked.first() {
        Some((community, count)) => format!(
            "{} has the most fans in this dataset with {} fans ({}% of the total).",
            community,
            count,
            percent(*count, records.len())
        ),
        None => "There are no fans in this dataset yet.".to_string(),
    }
}

fn fans_by_community(_query: &FanQuery, records: &[FanRecord]) -> String {
    let mut response = String::from("Fan counts by sports community:\n");
    for (community, count) in ranked_counts(records.iter().map(community_of)) {
        response.push_str(&format!(
            "{}: {} fans ({}%)\n",
            community,
            count,
            percent(count, records.len())
        ));
    }
    response
}

fn league_fan_count(query: &FanQuery, records: &[FanRecord]) -> String {
    let Some(league) = query.league else {
        return HELP_TEXT.to_string();
    };
    let count = league_records(records, league).len();

    format!(
        "There are {} {} fans in the dataset, representing {}% of all fans.",
        count,
        league,
        percent(count, records.len())
    )
}

fn league_popular_streaming(query: &FanQuery, records: &[FanRecord]) -> String {
    let Some(league) = query.league else {
        return HELP_TEXT.to_string();
    };
    let fans = league_records(records, league);
    let ranked = ranked_counts(fans.iter().copied().filter_map(streaming_merchant));

    if ranked.is_empty() {
        return format!("No streaming services found for {league} fans with sufficient data.");
    }

    let mut response = format!("Top streaming services for {league} fans:\n");
    for (idx, (merchant, count)) in ranked.iter().take(TOP_N).enumerate() {
        response.push_str(&format!(
            "{}. {}: {} fans ({}%)\n",
            idx + 1,
            format_merchant_name(Some(*merchant)),
            count,
            percent(*count, fans.len())
        ));
    }
    response
}

/// Sum and mean over the non-zero values only.
fn nonzero_sum_and_mean(values: impl Iterator<Item = Option<f64>>) -> (f64, f64) {
    let present: Vec<f64> = values.flatten().filter(|v| *v != 0.0).collect();
    let total: f64 = present.iter().sum();
    let mean = if present.is_empty() {
        0.0
    } else {
        total / present.len() as f64
    };
    (total, mean)
}

fn league_average_spend(query: &FanQuery, records: &[FanRecord]) -> String {
    let Some(league) = query.league else {
        return HELP_TEXT.to_string();
    };
    let fans = league_records(records, league);

    let (total_primary, avg_primary) = nonzero_sum_and_mean(fans.iter().map(|r| r.primary_spend));
    let (total_secondary, avg_secondary) =
        nonzero_sum_and_mean(fans.iter().map(|r| r.secondary_spend));

    let total_spend = total_primary + total_secondary;
    let avg_total = if fans.is_empty() {
        0.0
    } else {
        total_spend / fans.len() as f64
    };

    format!(
        "For {} fans ({} total):\n\
         Average primary streaming spend: ${}\n\
         Average secondary streaming spend: ${}\n\
         Total average spend per fan: ${}\n\
         Total community spend: ${}",
        league,
        fans.len(),
        to_fixed(avg_primary, 2),
        to_fixed(avg_secondary, 2),
        to_fixed(avg_total, 2),
        to_fixed(total_spend, 2)
    )
}

fn net_change(query: &FanQuery, records: &[FanRecord]) -> String {
    let (heading, rows): (String, Vec<&FanRecord>) = match query.league {
        Some(league) => (
            format!("Streaming subscription changes for {league} fans:"),
            league_records(records, league),
        ),
        None => (
            "Overall streaming subscription changes:".to_string(),
            records.iter().collect(),
        ),
    };

    let wins: f64 = rows.iter().map(|r| r.wins.unwrap_or(0.0)).sum();
    let losses: f64 = rows.iter().map(|r| r.losses.unwrap_or(0.0)).sum();
    let net: f64 = rows.iter().map(|r| r.net.unwrap_or(0.0)).sum();
    let trend = if net > 0.0 { "growth" } else { "decline" };

    format!(
        "{}\nNew subscriptions (wins): {}\nCanceled subscriptions (losses): {}\nNet change: {} ({})",
        heading,
        format_number(wins),
        format_number(losses),
        format_number(net),
        trend
    )
}

fn compare_streaming(_query: &FanQuery, records: &[FanRecord]) -> String {
    let merchants: Vec<&str> = records.iter().filter_map(streaming_merchant).collect();
    let ranked = ranked_counts(merchants.iter().copied());

    let mut response = String::from("Comparison of top streaming services:\n\n");
    for (merchant, count) in ranked.into_iter().take(TOP_N) {
        let subscribers: Vec<&FanRecord> = records
            .iter()
            .filter(|r| r.primary_merchant.as_deref() == Some(merchant))
            .collect();
        let spend: f64 = subscribers.iter().map(|r| r.primary_spend.unwrap_or(0.0)).sum();
        let avg_spend = spend / count as f64;

        let communities = ranked_counts(subscribers.iter().map(|r| community_of(r)));
        let (top_community, top_count) = communities.first().copied().unwrap_or((UNKNOWN_COMMUNITY, 0));

        response.push_str(&format!("{}:\n", format_merchant_name(Some(merchant))));
        response.push_str(&format!(
            "- Subscribers: {} ({}% of streaming fans)\n",
            count,
            percent(count, merchants.len())
        ));
        response.push_str(&format!("- Average spend: ${}\n", to_fixed(avg_spend, 2)));
        response.push_str(&format!(
            "- Most common fan type: {} ({}%)\n\n",
            top_community,
            percent(top_count, count)
        ));
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fan(
        community: &str,
        merchant: &str,
        primary: Option<f64>,
        secondary: Option<f64>,
        (wins, losses, net): (f64, f64, f64),
    ) -> FanRecord {
        FanRecord {
            community: Some(community.to_string()),
            primary_merchant: Some(merchant.to_string()),
            primary_spend: primary,
            secondary_spend: secondary,
            wins: Some(wins),
            losses: Some(losses),
            net: Some(net),
        }
    }

    fn table() -> Vec<FanRecord> {
        vec![
            fan("NBA", "netflix", Some(10.0), Some(5.0), (1.0, 0.0, 1.0)),
            fan("NBA", "espn_plus", Some(20.0), None, (0.0, 1.0, -1.0)),
            fan("NFL", "netflix", Some(30.0), Some(10.0), (2.0, 0.0, 2.0)),
            fan("NFL", "_none_", None, None, (0.0, 1.0, -1.0)),
            fan("WNBA", "youtube_tv", Some(40.0), None, (1.0, 1.0, 0.0)),
            fan("NBA", "netflix", None, Some(6.0), (0.0, 0.0, 0.0)),
        ]
    }

    #[test]
    fn popular_streaming_ranks_merchants_and_skips_none() {
        let answer = answer("What are the most popular streaming services?", &table());
        assert_eq!(
            answer,
            "The most popular streaming services among all sports fans are:\n\
             1. Netflix: 3 fans (50.0%)\n\
             2. Espn Plus: 1 fans (16.7%)\n\
             3. Youtube Tv: 1 fans (16.7%)\n"
        );
    }

    #[test]
    fn popular_streaming_for_a_league() {
        let answer = answer("Popular streaming for NFL fans", &table());
        assert_eq!(answer, "Top streaming services for NFL fans:\n1. Netflix: 1 fans (50.0%)\n");
    }

    #[test]
    fn league_without_merchants_says_so() {
        let records = vec![fan("MLS", "_none_", None, None, (0.0, 0.0, 0.0))];
        assert_eq!(
            answer("popular streaming among mls fans", &records),
            "No streaming services found for MLS fans with sufficient data."
        );
    }

    #[test]
    fn average_spend_for_a_league() {
        let answer = answer("What is the average spend for NBA fans?", &table());
        assert_eq!(
            answer,
            "For NBA fans (3 total):\n\
             Average primary streaming spend: $15.00\n\
             Average secondary streaming spend: $5.50\n\
             Total average spend per fan: $13.67\n\
             Total community spend: $41.00"
        );
    }

    #[test]
    fn percentages_round_exact_halves_up() {
        // 49 of 400 is exactly 12.25%.
        let mut records = vec![fan("NBA", "netflix", Some(1.0), None, (0.0, 0.0, 0.0)); 49];
        records.extend(vec![fan("NFL", "netflix", Some(1.0), None, (0.0, 0.0, 0.0)); 351]);
        assert_eq!(
            answer("how many nba fans are there", &records),
            "There are 49 NBA fans in the dataset, representing 12.3% of all fans."
        );
    }

    #[test]
    fn average_spend_rounds_exact_halves_up() {
        let records = vec![
            fan("NBA", "netflix", Some(10.25), None, (0.0, 0.0, 0.0)),
            fan("NBA", "_none_", None, None, (0.0, 0.0, 0.0)),
        ];
        let answer = answer("average spend for nba fans", &records);
        assert!(
            answer.contains("Total average spend per fan: $5.13"),
            "unexpected answer: {answer}"
        );
    }

    #[test]
    fn spend_by_community_sorted_descending() {
        let answer = answer("Show total spend by community", &table());
        assert_eq!(
            answer,
            "Total streaming spend by sports community:\nNBA: $41.00\nNFL: $40.00\nWNBA: $40.00\n"
        );
    }

    #[test]
    fn community_with_most_fans() {
        assert_eq!(
            answer("Which community has the most fans?", &table()),
            "NBA has the most fans in this dataset with 3 fans (50.0% of the total)."
        );
    }

    #[test]
    fn fan_counts_for_each_community() {
        assert_eq!(
            answer("How many fans are in each community?", &table()),
            "Fan counts by sports community:\nNBA: 3 fans (50.0%)\nNFL: 2 fans (33.3%)\nWNBA: 1 fans (16.7%)\n"
        );
    }

    #[test]
    fn wnba_is_not_read_as_nba() {
        assert_eq!(
            answer("how many wnba fans are there", &table()),
            "There are 1 WNBA fans in the dataset, representing 16.7% of all fans."
        );
        assert_eq!(
            answer("how many nba fans are there", &table()),
            "There are 3 NBA fans in the dataset, representing 50.0% of all fans."
        );
    }

    #[test]
    fn net_change_overall_and_per_league() {
        assert_eq!(
            answer("What is the net change in subscriptions?", &table()),
            "Overall streaming subscription changes:\n\
             New subscriptions (wins): 4\n\
             Canceled subscriptions (losses): 3\n\
             Net change: 1 (growth)"
        );
        assert_eq!(
            answer("NBA wins and losses", &table()),
            "Streaming subscription changes for NBA fans:\n\
             New subscriptions (wins): 1\n\
             Canceled subscriptions (losses): 1\n\
             Net change: 0 (decline)"
        );
    }

    #[test]
    fn compare_streaming_services() {
        let answer = answer("Compare streaming services", &table());
        assert!(answer.starts_with("Comparison of top streaming services:\n\nNetflix:\n"));
        assert!(answer.contains("- Subscribers: 3 (60.0% of streaming fans)\n"));
        assert!(answer.contains("- Average spend: $13.33\n"));
        assert!(answer.contains("- Most common fan type: NBA (66.7%)\n\n"));
        assert!(answer.contains("Youtube Tv:\n- Subscribers: 1 (20.0% of streaming fans)\n"));
        assert!(answer.contains("- Most common fan type: WNBA (100.0%)\n\n"));
    }

    #[test]
    fn unrecognised_question_gets_help_text() {
        assert_eq!(answer("tell me a joke", &table()), HELP_TEXT);
        assert_eq!(answer("", &[]), HELP_TEXT);
    }

    #[test]
    fn dispatch_order_resolves_overlaps() {
        // "average" blocks the community spend report; with no league named
        // nothing else matches.
        assert_eq!(matched_rule("average spend by community"), None);
        // A league routes the same words to the per-league average.
        assert_eq!(
            matched_rule("what is the average spend per community for nba"),
            Some("league_average_spend")
        );
        // Naming a league moves "popular streaming" off the overall ranking.
        assert_eq!(
            matched_rule("popular streaming services"),
            Some("popular_streaming_overall")
        );
        assert_eq!(
            matched_rule("popular streaming services for nhl"),
            Some("league_popular_streaming")
        );
        // A count question about a league wins over the popularity rule.
        assert_eq!(
            matched_rule("count popular streaming nfl"),
            Some("league_fan_count")
        );
    }

    #[test]
    fn merchant_names_are_title_cased() {
        assert_eq!(format_merchant_name(Some("youtube_tv")), "Youtube Tv");
        assert_eq!(format_merchant_name(Some("paramount+")), "Paramount+");
        assert_eq!(format_merchant_name(Some("_none_")), "None");
        assert_eq!(format_merchant_name(None), "None");
    }

    #[test]
    fn empty_table_does_not_panic() {
        assert_eq!(
            answer("which community has the most fans", &[]),
            "There are no fans in this dataset yet."
        );
        assert!(answer("average spend for nfl", &[]).contains("Total average spend per fan: $0.00"));
    }
}
