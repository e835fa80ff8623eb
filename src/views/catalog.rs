//! 仪表盘区块目录：每个区块只声明控件和“控件值 -> 面板配置”的映射，
//! 计算统一交给 `AggregateViewBuilder`。

use crate::aggregate::{Filter, Reducer, SortOrder, ViewConfig};
use crate::dataset::{CategoricalColumn, GroupKey, KeyValue, NumericColumn, Table};
use crate::views::controls::{Control, ControlValues};
use crate::views::render::{ChartSpec, PanelSpec};
use crate::views::section::DashboardSettings;

pub struct SectionDef {
    pub id: &'static str,
    pub title: &'static str,
    pub group: &'static str,
    pub controls: fn(&Table, &DashboardSettings) -> Vec<Control>,
    pub panels: fn(&ControlValues<'_>, &DashboardSettings) -> Vec<PanelSpec>,
}

pub static SECTIONS: &[SectionDef] = &[
    SectionDef {
        id: "item-analysis",
        title: "Item Analysis",
        group: "General",
        controls: item_analysis_controls,
        panels: item_analysis_panels,
    },
    SectionDef {
        id: "statistics",
        title: "Statistical Evaluation",
        group: "General",
        controls: statistics_controls,
        panels: statistics_panels,
    },
    SectionDef {
        id: "distribution",
        title: "Item Distribution",
        group: "General",
        controls: distribution_controls,
        panels: distribution_panels,
    },
    SectionDef {
        id: "releases-by-decade",
        title: "Released Films per Decade",
        group: "General",
        controls: no_controls,
        panels: releases_panels,
    },
    SectionDef {
        id: "votes-by-decade",
        title: "Total Votes per Decade",
        group: "General",
        controls: no_controls,
        panels: votes_panels,
    },
    SectionDef {
        id: "upcoming",
        title: "Upcoming Releases",
        group: "General",
        controls: no_controls,
        panels: upcoming_panels,
    },
    SectionDef {
        id: "genre-decades",
        title: "Genre Analysis Over Decades",
        group: "Genres",
        controls: decade_controls,
        panels: genre_decades_panels,
    },
    SectionDef {
        id: "genre-popularity",
        title: "Genre Popularity Across Decades",
        group: "Genres",
        controls: decade_controls,
        panels: genre_popularity_panels,
    },
    SectionDef {
        id: "genre-rating",
        title: "Average Vote Score of Genres Over Decades",
        group: "Genres",
        controls: genre_controls,
        panels: genre_rating_panels,
    },
    SectionDef {
        id: "adult-content",
        title: "Adult Content Analysis",
        group: "Genres",
        controls: adult_controls,
        panels: adult_panels,
    },
    SectionDef {
        id: "rating-popularity",
        title: "Rating vs. Popularity",
        group: "Correlation",
        controls: no_controls,
        panels: rating_popularity_panels,
    },
    SectionDef {
        id: "budget-rating",
        title: "Budget vs. Vote Average",
        group: "Correlation",
        controls: no_controls,
        panels: budget_rating_panels,
    },
    SectionDef {
        id: "budget-revenue",
        title: "Budget vs. Revenue",
        group: "Correlation",
        controls: no_controls,
        panels: budget_revenue_panels,
    },
    SectionDef {
        id: "correlation",
        title: "Attribute Correlation",
        group: "Correlation",
        controls: correlation_controls,
        panels: correlation_panels,
    },
    SectionDef {
        id: "popularity-correlation",
        title: "Popularity Correlation",
        group: "Correlation",
        controls: popularity_controls,
        panels: popularity_panels,
    },
    SectionDef {
        id: "runtime",
        title: "Runtime vs. Popularity/Revenue",
        group: "Correlation",
        controls: runtime_controls,
        panels: runtime_panels,
    },
    SectionDef {
        id: "countries",
        title: "Country Performance",
        group: "Production",
        controls: country_controls,
        panels: country_panels,
    },
    SectionDef {
        id: "companies",
        title: "Production Companies",
        group: "Production",
        controls: company_controls,
        panels: company_panels,
    },
];

pub fn find(id: &str) -> Option<(usize, &'static SectionDef)> {
    SECTIONS
        .iter()
        .enumerate()
        .find(|(_, d)| d.id.eq_ignore_ascii_case(id.trim()))
}

const LOW_VOTE_LIMIT: f64 = 5.0;
const SCATTER_ATTRIBUTES: [&str; 6] = [
    "revenue",
    "budget",
    "popularity",
    "vote_count",
    "vote_average",
    "runtime",
];

fn label(name: Option<&str>) -> String {
    match name {
        Some(n) => NumericColumn::from_name(n)
            .map(|c| c.to_string())
            .unwrap_or_else(|| n.to_string()),
        None => "-".to_string(),
    }
}

fn bars(x: &str, y: &str) -> ChartSpec {
    ChartSpec::Bars {
        x_label: x.to_string(),
        y_label: y.to_string(),
    }
}

fn scatter(x: Option<&str>, y: Option<&str>, log_axes: bool) -> ChartSpec {
    ChartSpec::Scatter {
        x: x.map(str::to_string),
        y: y.map(str::to_string),
        log_axes,
    }
}

fn no_controls(_: &Table, _: &DashboardSettings) -> Vec<Control> {
    Vec::new()
}

fn attribute_dropdown(table: &Table) -> Control {
    let options: Vec<String> = table
        .analysable_columns()
        .into_iter()
        .map(|c| c.name().to_string())
        .collect();
    Control::dropdown("attribute", "Attribute", options, None)
}

fn low_votes_toggle() -> Control {
    Control::toggle("votes", "Exclude movies with ≤5 votes", false)
}

fn low_votes_filter(v: &ControlValues<'_>) -> Option<Filter> {
    v.flag("votes")
        .then(|| Filter::above(NumericColumn::VoteCount, LOW_VOTE_LIMIT))
}

// ---- General ----

fn item_analysis_controls(table: &Table, _: &DashboardSettings) -> Vec<Control> {
    vec![
        attribute_dropdown(table),
        Control::radio("runtime_filter", "Runtime Outlier-Filter", &["off", "iqr"], "off"),
        Control::number("budget", "Budget Threshold (≥)", 0.0, 1e6),
        Control::number("revenue", "Revenue Threshold (≥)", 0.0, 1e6),
    ]
}

/// IQR 过滤只在分析 runtime 时生效
fn runtime_outliers(v: &ControlValues<'_>, attribute: Option<&str>) -> Option<Filter> {
    (v.text("runtime_filter") == Some("iqr") && attribute == Some("runtime")).then_some(
        Filter::IqrTrim {
            column: NumericColumn::Runtime,
        },
    )
}

fn item_analysis_panels(v: &ControlValues<'_>, s: &DashboardSettings) -> Vec<PanelSpec> {
    let attribute = v.text("attribute");
    let mut query = ViewConfig::new()
        .attribute(attribute)
        .filter(Filter::Released)
        .filters(runtime_outliers(v, attribute))
        .with_summary();
    // 阈值为 0 表示不过滤
    for (column, id) in [
        (NumericColumn::Budget, "budget"),
        (NumericColumn::Revenue, "revenue"),
    ] {
        let threshold = v.number(id);
        if threshold != 0.0 {
            query = query.filter(Filter::at_least(column, threshold));
        }
    }
    let name = label(attribute);
    vec![
        PanelSpec::new(
            format!("Summary Statistics for {}", name),
            query.clone(),
            ChartSpec::Summary,
        ),
        PanelSpec::new(
            format!("Histogram of {}", name),
            query,
            ChartSpec::Histogram {
                bins: s.histogram_bins,
            },
        ),
    ]
}

fn statistics_controls(table: &Table, _: &DashboardSettings) -> Vec<Control> {
    vec![attribute_dropdown(table)]
}

fn statistics_panels(v: &ControlValues<'_>, _: &DashboardSettings) -> Vec<PanelSpec> {
    let attribute = v.text("attribute");
    vec![PanelSpec::new(
        format!("Summary Statistics for {}", label(attribute)),
        ViewConfig::new()
            .attribute(attribute)
            .filter(Filter::Released)
            .with_summary(),
        ChartSpec::Summary,
    )]
}

fn distribution_controls(table: &Table, _: &DashboardSettings) -> Vec<Control> {
    vec![
        attribute_dropdown(table),
        Control::radio("runtime_filter", "Runtime Outlier-Filter", &["off", "iqr"], "off"),
        Control::number("budget", "Budget Threshold (>)", 0.0, 1e6),
        Control::number("revenue", "Revenue Threshold (>)", 0.0, 1e6),
    ]
}

/// 与 item-analysis 不同：阈值总是生效且为严格大于
fn distribution_panels(v: &ControlValues<'_>, s: &DashboardSettings) -> Vec<PanelSpec> {
    let attribute = v.text("attribute");
    let query = ViewConfig::new()
        .attribute(attribute)
        .filter(Filter::Released)
        .filters(runtime_outliers(v, attribute))
        .filter(Filter::above(NumericColumn::Budget, v.number("budget")))
        .filter(Filter::above(NumericColumn::Revenue, v.number("revenue")));
    vec![PanelSpec::new(
        format!("Distribution of {}", label(attribute)),
        query,
        ChartSpec::Histogram {
            bins: s.histogram_bins,
        },
    )]
}

fn releases_panels(_: &ControlValues<'_>, _: &DashboardSettings) -> Vec<PanelSpec> {
    vec![PanelSpec::new(
        "Released Films per Decade",
        ViewConfig::new().group_by("decade").reducer(Reducer::Count),
        bars("Decade", "Number of Films"),
    )]
}

fn votes_panels(_: &ControlValues<'_>, _: &DashboardSettings) -> Vec<PanelSpec> {
    vec![PanelSpec::new(
        "Total Votes per Decade",
        ViewConfig::new()
            .attribute(Some("vote_count"))
            .group_by("decade")
            .reducer(Reducer::Sum),
        bars("Decade", "Total Votes"),
    )]
}

fn upcoming_panels(_: &ControlValues<'_>, _: &DashboardSettings) -> Vec<PanelSpec> {
    vec![PanelSpec::new(
        "Upcoming Releases",
        ViewConfig::new().filter(Filter::Upcoming),
        ChartSpec::Listing,
    )]
}

// ---- Genres ----

fn decade_controls(table: &Table, _: &DashboardSettings) -> Vec<Control> {
    let options = table.decades().into_iter().map(|d| d.to_string()).collect();
    vec![Control::dropdown("decade", "Decade", options, None)]
}

fn selected_decade(v: &ControlValues<'_>) -> Option<i32> {
    v.text("decade").and_then(|s| s.parse().ok())
}

fn decade_filter(decade: i32) -> Filter {
    Filter::Equals {
        key: GroupKey::Decade,
        value: KeyValue::Decade(decade),
    }
}

fn genre_decades_panels(v: &ControlValues<'_>, _: &DashboardSettings) -> Vec<PanelSpec> {
    let leaders = PanelSpec::new(
        "Biggest Genre per Decade",
        ViewConfig::new()
            .group_by("decade")
            .group_by("genres")
            .reducer(Reducer::Count)
            .order(SortOrder::LeaderPerFirstKey),
        bars("Decade / Genre", "Number of Films"),
    );
    let distribution = match selected_decade(v) {
        Some(d) => PanelSpec::new(
            format!("Genre Distribution in {}", d),
            ViewConfig::new()
                .group_by("genres")
                .reducer(Reducer::Count)
                .filter(decade_filter(d))
                .order(SortOrder::ByValueDesc),
            bars("Genre", "Number of Films"),
        ),
        None => PanelSpec::empty("Genre Distribution", bars("Genre", "Number of Films")),
    };
    vec![leaders, distribution]
}

fn genre_popularity_panels(v: &ControlValues<'_>, _: &DashboardSettings) -> Vec<PanelSpec> {
    let chart = bars("Genre", "Average Popularity");
    match selected_decade(v) {
        Some(d) => vec![PanelSpec::new(
            format!("Genre Ranking in {}", d),
            ViewConfig::new()
                .attribute(Some("popularity"))
                .group_by("genres")
                .filter(decade_filter(d))
                .order(SortOrder::ByValueDesc),
            chart,
        )],
        None => vec![PanelSpec::empty("Genre Ranking", chart)],
    }
}

fn genre_controls(table: &Table, _: &DashboardSettings) -> Vec<Control> {
    let options = table.categories(CategoricalColumn::Genres, 1);
    vec![Control::dropdown("genre", "Genre", options, None)]
}

fn genre_rating_panels(v: &ControlValues<'_>, _: &DashboardSettings) -> Vec<PanelSpec> {
    let chart = bars("Decade", "Average Vote Score");
    match v.text("genre") {
        Some(g) => vec![PanelSpec::new(
            format!("Average Vote Score for {} Over Decades", g),
            ViewConfig::new()
                .attribute(Some("vote_average"))
                .group_by("decade")
                .filter(Filter::Equals {
                    key: GroupKey::Category(CategoricalColumn::Genres),
                    value: KeyValue::Text(g.to_string()),
                }),
            chart,
        )],
        None => vec![PanelSpec::empty("Average Vote Score", chart)],
    }
}

fn adult_controls(_: &Table, _: &DashboardSettings) -> Vec<Control> {
    vec![
        Control::dropdown(
            "metric",
            "Metric",
            vec!["revenue".into(), "vote_average".into()],
            Some("revenue"),
        ),
        low_votes_toggle(),
    ]
}

fn adult_panels(v: &ControlValues<'_>, _: &DashboardSettings) -> Vec<PanelSpec> {
    let metric = v.text("metric");
    vec![PanelSpec::new(
        format!(
            "Comparison of Adult and Non-Adult Movies by {}",
            label(metric)
        ),
        ViewConfig::new()
            .attribute(metric)
            .group_by("adult")
            .filters(low_votes_filter(v)),
        bars("Movie Type", &label(metric)),
    )]
}

// ---- Correlation ----

fn rating_popularity_panels(_: &ControlValues<'_>, _: &DashboardSettings) -> Vec<PanelSpec> {
    vec![PanelSpec::new(
        "Correlation Between Movie Ratings and Popularity",
        ViewConfig::new().filter(Filter::percentile(&[
            NumericColumn::VoteAverage,
            NumericColumn::Popularity,
        ])),
        scatter(Some("vote_average"), Some("popularity"), false),
    )]
}

fn budget_rating_panels(_: &ControlValues<'_>, _: &DashboardSettings) -> Vec<PanelSpec> {
    vec![PanelSpec::new(
        "Correlation Between Movie Budget and Vote Average",
        ViewConfig::new().filter(Filter::percentile(&[
            NumericColumn::Budget,
            NumericColumn::VoteAverage,
        ])),
        scatter(Some("budget"), Some("vote_average"), false),
    )]
}

fn budget_revenue_panels(_: &ControlValues<'_>, _: &DashboardSettings) -> Vec<PanelSpec> {
    vec![PanelSpec::new(
        "Budget vs. Revenue Correlation",
        ViewConfig::new()
            .filter(Filter::above(NumericColumn::Budget, 0.0))
            .filter(Filter::above(NumericColumn::Revenue, 0.0)),
        scatter(Some("budget"), Some("revenue"), true),
    )]
}

fn correlation_controls(_: &Table, _: &DashboardSettings) -> Vec<Control> {
    vec![
        Control::radio("x", "X-Axis Attribute", &SCATTER_ATTRIBUTES, "budget"),
        Control::radio("y", "Y-Axis Attribute", &SCATTER_ATTRIBUTES, "revenue"),
    ]
}

fn correlation_panels(v: &ControlValues<'_>, _: &DashboardSettings) -> Vec<PanelSpec> {
    let (x, y) = (v.text("x"), v.text("y"));
    vec![PanelSpec::new(
        format!("{} vs. {} Correlation", label(x), label(y)),
        ViewConfig::new(),
        scatter(x, y, true),
    )]
}

fn popularity_controls(_: &Table, _: &DashboardSettings) -> Vec<Control> {
    vec![Control::radio(
        "y",
        "Attribute",
        &["revenue", "vote_average"],
        "revenue",
    )]
}

fn popularity_panels(v: &ControlValues<'_>, _: &DashboardSettings) -> Vec<PanelSpec> {
    let y = v.text("y");
    vec![PanelSpec::new(
        format!("Popularity vs. {} Correlation", label(y)),
        ViewConfig::new(),
        scatter(Some("popularity"), y, true),
    )]
}

fn runtime_controls(_: &Table, _: &DashboardSettings) -> Vec<Control> {
    vec![
        Control::dropdown(
            "metric",
            "Metric",
            vec!["popularity".into(), "revenue".into()],
            Some("popularity"),
        ),
        low_votes_toggle(),
    ]
}

fn runtime_panels(v: &ControlValues<'_>, _: &DashboardSettings) -> Vec<PanelSpec> {
    let metric = v.text("metric");
    vec![PanelSpec::new(
        format!("Runtime vs. {}", label(metric)),
        ViewConfig::new()
            .filter(Filter::percentile(&[
                NumericColumn::Runtime,
                NumericColumn::Popularity,
                NumericColumn::Revenue,
            ]))
            .filters(low_votes_filter(v)),
        scatter(Some("runtime"), metric, false),
    )]
}

// ---- Production ----

fn category_controls(
    table: &Table,
    settings: &DashboardSettings,
    column: CategoricalColumn,
    noun: &str,
) -> Vec<Control> {
    let options = table.categories(column, settings.min_category_count);
    vec![
        Control::dropdown("category", noun, options, None),
        Control::radio(
            "metric",
            "Metric",
            &["revenue", "popularity", "vote_average"],
            "revenue",
        ),
        Control::radio("aggregation", "Aggregation", &["mean", "sum"], "mean"),
        Control::slider("top", "Top N", 5.0, 15.0, 5.0, 5.0),
    ]
}

fn category_panels(
    v: &ControlValues<'_>,
    settings: &DashboardSettings,
    column: CategoricalColumn,
    noun: &str,
    plural: &str,
) -> Vec<PanelSpec> {
    let metric = v.text("metric");
    // vote_average 只做均值
    let reducer = match metric {
        Some("vote_average") => Reducer::Mean,
        _ => v
            .text("aggregation")
            .and_then(Reducer::from_name)
            .unwrap_or(Reducer::Mean),
    };
    let prefix = if reducer == Reducer::Sum {
        "Total"
    } else {
        "Average"
    };
    let metric_label = label(metric);
    let top = v.number("top").max(1.0) as usize;
    let base = ViewConfig::new()
        .attribute(metric)
        .group_by(column.name())
        .reducer(reducer)
        .filter(Filter::MinCategoryCount {
            column,
            min: settings.min_category_count,
        });

    let selected = match v.text("category") {
        Some(c) => PanelSpec::new(
            format!("{}: {} {}", c, prefix, metric_label),
            base.clone().filter(Filter::Equals {
                key: GroupKey::Category(column),
                value: KeyValue::Text(c.to_string()),
            }),
            bars(noun, &metric_label),
        ),
        None => PanelSpec::empty(noun, bars(noun, &metric_label)),
    };
    let ranking = PanelSpec::new(
        format!("Top {} {}: {} {}", top, plural, prefix, metric_label),
        base.order(SortOrder::ByValueDesc).limit(top),
        bars(noun, &metric_label),
    );
    vec![selected, ranking]
}

fn country_controls(table: &Table, settings: &DashboardSettings) -> Vec<Control> {
    category_controls(
        table,
        settings,
        CategoricalColumn::ProductionCountries,
        "Production Country",
    )
}

fn country_panels(v: &ControlValues<'_>, settings: &DashboardSettings) -> Vec<PanelSpec> {
    category_panels(
        v,
        settings,
        CategoricalColumn::ProductionCountries,
        "Production Country",
        "Countries",
    )
}

fn company_controls(table: &Table, settings: &DashboardSettings) -> Vec<Control> {
    category_controls(
        table,
        settings,
        CategoricalColumn::ProductionCompanies,
        "Production Company",
    )
}

fn company_panels(v: &ControlValues<'_>, settings: &DashboardSettings) -> Vec<PanelSpec> {
    category_panels(
        v,
        settings,
        CategoricalColumn::ProductionCompanies,
        "Production Company",
        "Companies",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::loader::read_movies;
    use crate::views::controls::ControlEvent;
    use crate::views::node::ViewNode;
    use crate::views::section::{Section, View};
    use chrono::NaiveDate;
    use std::sync::Arc;

    const CSV: &str = "\
id,title,release_date,budget,revenue,popularity,vote_average,vote_count,runtime,genres,production_companies,production_countries,adult,status
1,A,1994-01-01,100,500,10,7.0,100,120,\"Action, Drama\",Alpha,\"France, Italy\",False,Released
2,B,1996-01-01,0,0,20,6.0,3,95,Drama,Alpha,France,False,Released
3,C,2004-01-01,50,0,30,5.0,40,400,\"['Comedy', 'Drama']\",Beta,France,True,Released
4,D,2007-01-01,200,900,40,8.0,80,100,Comedy,Alpha,Italy,False,Released
5,E,2026-02-01,10,0,5,0,0,,Drama,Beta,Chad,False,Planned
";

    fn table() -> Arc<Table> {
        let cutoff = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        Arc::new(read_movies(CSV.as_bytes(), cutoff).unwrap().0)
    }

    fn settings() -> DashboardSettings {
        DashboardSettings {
            histogram_bins: 4,
            min_category_count: 2,
        }
    }

    fn section(id: &str) -> Section {
        let (_, def) = find(id).unwrap();
        Section::new(def, table(), settings())
    }

    fn set(control: &str, value: &str) -> ControlEvent {
        ControlEvent::Set {
            control: control.into(),
            value: value.into(),
        }
    }

    fn bars_of(node: &ViewNode) -> Vec<(String, f64)> {
        match node {
            ViewNode::Bars { bars, .. } => bars.iter().map(|b| (b.label.clone(), b.value)).collect(),
            other => panic!("expected bars, got {:?}", other),
        }
    }

    #[test]
    fn ids_are_unique() {
        for (i, a) in SECTIONS.iter().enumerate() {
            assert!(SECTIONS[i + 1..].iter().all(|b| b.id != a.id), "{}", a.id);
        }
    }

    #[test]
    fn every_section_renders() {
        let t = table();
        for def in SECTIONS {
            let s = Section::new(def, t.clone(), settings());
            let node = s.render();
            assert!(!node.children().is_empty(), "{}", def.id);
        }
    }

    #[test]
    fn releases_by_decade() {
        let node = section("releases-by-decade").render();
        assert_eq!(
            bars_of(&node),
            vec![("1990".to_string(), 2.0), ("2000".to_string(), 2.0)]
        );
    }

    #[test]
    fn item_analysis_placeholder_without_attribute() {
        let mut s = section("item-analysis");
        let node = s
            .bind(&ControlEvent::Clear {
                control: "attribute".into(),
            })
            .unwrap();
        for child in node.children() {
            assert_eq!(child, &ViewNode::placeholder("请选择一个属性。"));
        }
    }

    #[test]
    fn item_analysis_runtime_iqr_and_thresholds() {
        let mut s = section("item-analysis");
        s.bind(&set("attribute", "runtime")).unwrap();
        let node = s.bind(&set("runtime_filter", "iqr")).unwrap();
        match &node.children()[0] {
            ViewNode::Summary { stats, .. } => {
                // 400 分钟为离群值，未上映的 E 无 runtime
                assert_eq!(stats.count, 3);
                assert_eq!(stats.max, Some(120.0));
            }
            other => panic!("expected summary, got {:?}", other),
        }

        let node = s.bind(&set("budget", "100")).unwrap();
        match &node.children()[0] {
            ViewNode::Summary { stats, .. } => assert_eq!(stats.count, 2),
            other => panic!("expected summary, got {:?}", other),
        }
    }

    #[test]
    fn distribution_thresholds_are_strict() {
        let mut s = section("distribution");
        let node = s.bind(&set("attribute", "budget")).unwrap();
        match node {
            ViewNode::Histogram { bins, .. } => {
                // 只有 budget > 0 且 revenue > 0 的 A 和 D
                assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
            }
            other => panic!("expected histogram, got {:?}", other),
        }
    }

    #[test]
    fn genre_decades_leader_and_distribution() {
        let mut s = section("genre-decades");
        let node = s.bind(&set("decade", "2000")).unwrap();
        let children = node.children();
        assert_eq!(
            bars_of(&children[0]),
            vec![
                ("1990 / Drama".to_string(), 2.0),
                ("2000 / Comedy".to_string(), 2.0)
            ]
        );
        assert_eq!(
            bars_of(&children[1]),
            vec![("Comedy".to_string(), 2.0), ("Drama".to_string(), 1.0)]
        );
    }

    #[test]
    fn genre_rating_follows_selected_genre() {
        let mut s = section("genre-rating");
        let node = s.bind(&set("genre", "Comedy")).unwrap();
        assert_eq!(
            bars_of(&node),
            vec![("2000".to_string(), 6.5)]
        );
    }

    #[test]
    fn adult_content_with_vote_filter() {
        let mut s = section("adult-content");
        s.bind(&set("metric", "vote_average")).unwrap();
        let node = s.bind(&set("votes", "on")).unwrap();
        assert_eq!(
            bars_of(&node),
            vec![("Non-Adult".to_string(), 7.5), ("Adult".to_string(), 5.0)]
        );
    }

    #[test]
    fn budget_revenue_scatter_keeps_positive_pairs() {
        let node = section("budget-revenue").render();
        match node {
            ViewNode::Scatter {
                points, log_axes, ..
            } => {
                assert!(log_axes);
                let titles: Vec<&str> = points.iter().map(|p| p.label.as_str()).collect();
                assert_eq!(titles, vec!["A", "D"]);
            }
            other => panic!("expected scatter, got {:?}", other),
        }
    }

    #[test]
    fn upcoming_lists_future_titles() {
        match section("upcoming").render() {
            ViewNode::Listing { rows, .. } => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0][1], "E");
            }
            other => panic!("expected listing, got {:?}", other),
        }
    }

    #[test]
    fn countries_ranking_respects_min_count_and_top_n() {
        let mut s = section("countries");
        // Chad 只有一部电影，不在候选内
        let options: Vec<String> = match &s.controls()[0].kind {
            crate::views::controls::ControlKind::Choice { options, .. } => options.clone(),
            _ => unreachable!(),
        };
        assert_eq!(options, vec!["France".to_string(), "Italy".to_string()]);

        s.bind(&set("aggregation", "sum")).unwrap();
        let node = s.bind(&set("category", "Italy")).unwrap();
        let children = node.children();
        assert_eq!(bars_of(&children[0]), vec![("Italy".to_string(), 1400.0)]);
        assert_eq!(
            bars_of(&children[1]),
            vec![("Italy".to_string(), 1400.0), ("France".to_string(), 500.0)]
        );

        // vote_average 忽略 sum
        let node = s.bind(&set("metric", "vote_average")).unwrap();
        assert_eq!(bars_of(&node.children()[0]), vec![("Italy".to_string(), 7.5)]);
    }

    #[test]
    fn attribute_sections_skip_unreleased_and_undated_rows() {
        let csv = "\
id,title,release_date,budget,revenue,popularity,vote_average,vote_count,runtime,genres,production_companies,production_countries,adult,status
1,A,1994-01-01,100,500,10,7.0,100,120,Drama,Alpha,France,False,Released
2,B,2027-05-01,9000,900,40,8.0,80,100,Comedy,Alpha,Italy,False,Planned
3,C,someday,7000,800,30,5.0,40,90,Drama,Beta,France,False,Released
";
        let cutoff = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let t = Arc::new(read_movies(csv.as_bytes(), cutoff).unwrap().0);
        for id in ["statistics", "item-analysis"] {
            let (_, def) = find(id).unwrap();
            let mut s = Section::new(def, t.clone(), settings());
            let node = s.bind(&set("attribute", "budget")).unwrap();
            match &node.children()[0] {
                ViewNode::Summary { stats, .. } => {
                    assert_eq!(stats.count, 1, "{}", id);
                    assert_eq!(stats.max, Some(100.0), "{}", id);
                }
                other => panic!("expected summary in {}, got {:?}", id, other),
            }
        }

        let (_, def) = find("distribution").unwrap();
        let mut s = Section::new(def, t, settings());
        match s.bind(&set("attribute", "budget")).unwrap() {
            ViewNode::Histogram { bins, .. } => {
                assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 1);
            }
            other => panic!("expected histogram, got {:?}", other),
        }
    }

    #[test]
    fn unknown_control_is_rejected() {
        let mut s = section("statistics");
        assert!(s.bind(&set("nope", "x")).is_err());
    }
}
