use crate::dataset::{CategoricalColumn, Movie};
use regex::Regex;
use std::sync::OnceLock;

fn list_noise() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\[\]']").expect("static pattern"))
}

/// 去掉列表残留的方括号和单引号，例如 "['Action', 'Drama']"
pub fn normalize_categories(raw: &str) -> String {
    list_noise().replace_all(raw, "").into_owned()
}

/// 归一化后按逗号拆分，去空白并丢弃空值
pub fn split_values(raw: &str) -> Vec<String> {
    normalize_categories(raw)
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("nan"))
        .map(str::to_string)
        .collect()
}

/// 每个分类值复制一行；没有有效值的记录被丢弃
pub fn explode(records: Vec<Movie>, column: CategoricalColumn) -> Vec<Movie> {
    let mut out = Vec::with_capacity(records.len());
    for movie in records {
        let values = split_values(movie.category(column));
        let Some((last, rest)) = values.split_last() else {
            continue;
        };
        for v in rest {
            let mut copy = movie.clone();
            copy.set_category(column, v.clone());
            out.push(copy);
        }
        let mut movie = movie;
        movie.set_category(column, last.clone());
        out.push(movie);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explodes_one_row_per_value() {
        let movie = Movie {
            title: "Heat".into(),
            genres: "Action, Drama".into(),
            budget: Some(60.0),
            production_countries: "France, Italy".into(),
            ..Default::default()
        };
        let rows = explode(vec![movie.clone()], CategoricalColumn::Genres);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].genres, "Action");
        assert_eq!(rows[1].genres, "Drama");
        for row in &rows {
            assert_eq!(row.title, movie.title);
            assert_eq!(row.budget, movie.budget);
            assert_eq!(row.production_countries, movie.production_countries);
        }
    }

    #[test]
    fn strips_list_noise_and_empty_entries() {
        assert_eq!(
            split_values("['Action', 'Drama', '']"),
            vec!["Action".to_string(), "Drama".to_string()]
        );
        assert_eq!(split_values("  "), Vec::<String>::new());
        assert_eq!(split_values("nan"), Vec::<String>::new());
    }

    #[test]
    fn drops_records_without_values() {
        let rows = explode(
            vec![Movie::default(), Movie {
                genres: "Drama".into(),
                ..Default::default()
            }],
            CategoricalColumn::Genres,
        );
        assert_eq!(rows.len(), 1);
    }
}
