use serde::{Deserialize, Serialize};

/// Окно выборки для постраничного вывода
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    /// Номер страницы, начиная с 1
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

impl PageWindow {
    /// Разрешить запрошенную страницу относительно общего числа записей.
    ///
    /// Нечисловой или отсутствующий номер даёт первую страницу, номер за
    /// пределами диапазона даёт последнюю. Пустая выборка состоит из одной
    /// пустой страницы.
    pub fn resolve(requested: Option<&str>, total: u64, page_size: u64) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total.div_ceil(page_size).max(1);

        let page = match requested.map(str::trim).map(str::parse::<u64>) {
            Some(Ok(0)) => 1,
            Some(Ok(n)) => n.min(total_pages),
            Some(Err(_)) | None => 1,
        };

        Self {
            page,
            page_size,
            total_pages,
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.page_size
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

/// Страница результатов
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: u64, window: PageWindow) -> Self {
        Self {
            items,
            total,
            page: window.page,
            page_size: window.page_size,
            total_pages: window.total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}
