use serde::Serialize;

/// One page of an ordered result set. Pages are 1-indexed; a requested page
/// outside the valid range is clamped to the nearest valid page rather than
/// rejected, matching standard paginator behavior.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

pub fn total_pages(total: i64, page_size: i64) -> i64 {
    if total <= 0 {
        1
    } else {
        (total + page_size - 1) / page_size
    }
}

pub fn clamp_page(page: i64, total_pages: i64) -> i64 {
    page.clamp(1, total_pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(30, 10), 3);
        assert_eq!(total_pages(31, 10), 4);
    }

    #[test]
    fn empty_result_set_still_has_one_page() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(clamp_page(5, total_pages(0, 10)), 1);
    }

    #[test]
    fn out_of_range_pages_clamp_to_nearest() {
        // 25 records at size 10: page 4 clamps down to page 3, page 0 up to 1.
        let pages = total_pages(25, 10);
        assert_eq!(clamp_page(4, pages), 3);
        assert_eq!(clamp_page(0, pages), 1);
        assert_eq!(clamp_page(-7, pages), 1);
        assert_eq!(clamp_page(2, pages), 2);
    }
}
