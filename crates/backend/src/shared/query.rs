/// Разобранная строка запроса с сохранением повторяющихся ключей
///
/// `axum::extract::Query` не умеет собирать повторяющиеся параметры
/// (`products[]=A&products[]=B`), поэтому строка разбирается вручную.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Разобрать `application/x-www-form-urlencoded` строку
    pub fn parse(raw: Option<&str>) -> Self {
        let pairs = raw
            .unwrap_or_default()
            .split('&')
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once('=') {
                Some((key, value)) => (decode(key), decode(value)),
                None => (decode(part), String::new()),
            })
            .collect();
        Self { pairs }
    }

    /// Первое значение параметра
    pub fn first(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Все значения параметров с любым из указанных ключей, в порядке следования
    pub fn all(&self, keys: &[&str]) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|(k, _)| keys.contains(&k.as_str()))
            .map(|(_, v)| v.clone())
            .collect()
    }
}

fn decode(component: &str) -> String {
    let spaced = component.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_keys_are_kept() {
        let params = QueryParams::parse(Some("type=bar&products[]=A&products[]=B&products=C"));
        assert_eq!(params.first("type"), Some("bar"));
        assert_eq!(params.all(&["products[]"]), vec!["A", "B"]);
        assert_eq!(params.all(&["products[]", "products"]), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_percent_and_plus_decoding() {
        let params = QueryParams::parse(Some(
            "products%5B%5D=%D0%9D%D0%BE%D1%83%D1%82%D0%B1%D1%83%D0%BA&name=a+b",
        ));
        assert_eq!(params.all(&["products[]"]), vec!["Ноутбук"]);
        assert_eq!(params.first("name"), Some("a b"));
    }

    #[test]
    fn test_empty_and_valueless() {
        assert_eq!(QueryParams::parse(None), QueryParams::default());
        let params = QueryParams::parse(Some("year&&month="));
        assert_eq!(params.first("year"), Some(""));
        assert_eq!(params.first("month"), Some(""));
        assert_eq!(params.first("type"), None);
    }
}
