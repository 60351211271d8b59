// Copyright (c) 2023 - 2026 Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

#[derive(Debug, thiserror::Error)]
pub enum PaginationError {
    #[error("the page size provided must not be negative")]
    NegativePageSize,
    #[error("the maximum response provided must be positive")]
    NonPositiveMaxResponse,
    #[error("invalid page token: {0}. Token must be within the range [0, max_response]")]
    InvalidPageToken(String),
}

/// One window over the virtual collection `[0, max_response)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub items: Vec<i32>,
    /// Decimal offset to resume from; empty once the collection is
    /// exhausted.
    pub next_page_token: String,
}

/// Computes a page of the integer sequence `[0, max_response)`.
///
/// The page token is the decimal start offset, `page_size_override` wins
/// over `page_size` when positive, and an effective size of zero means
/// "everything from the start offset". Pure: identical inputs always yield
/// identical pages, which client libraries rely on when re-paging.
pub fn paginate(
    page_size: i32,
    page_size_override: i32,
    page_token: &str,
    max_response: i32,
) -> Result<Page, PaginationError> {
    if page_size < 0 || page_size_override < 0 {
        return Err(PaginationError::NegativePageSize);
    }
    if max_response <= 0 {
        return Err(PaginationError::NonPositiveMaxResponse);
    }

    let start = if page_token.is_empty() {
        0
    } else {
        match page_token.parse::<i32>() {
            Ok(token) if (0..=max_response).contains(&token) => token,
            _ => return Err(PaginationError::InvalidPageToken(page_token.to_owned())),
        }
    };

    let effective_size = if page_size_override > 0 {
        page_size_override
    } else {
        page_size
    };
    let end = if effective_size == 0 {
        max_response
    } else {
        max_response.min(start.saturating_add(effective_size))
    };

    let next_page_token = if end < max_response {
        end.to_string()
    } else {
        String::new()
    };

    Ok(Page {
        items: (start..end).collect(),
        next_page_token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use googletest::prelude::*;

    #[test]
    fn walking_tokens_partitions_the_collection() {
        let mut token = String::new();
        let mut seen = Vec::new();
        loop {
            let page = paginate(3, 0, &token, 10).unwrap();
            seen.extend(page.items);
            if page.next_page_token.is_empty() {
                break;
            }
            token = page.next_page_token;
        }
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn first_page_and_tokens_match_the_documented_example() {
        let page = paginate(3, 0, "", 10).unwrap();
        assert_that!(page.items, container_eq(vec![0, 1, 2]));
        assert_that!(page.next_page_token, eq("3"));

        let page = paginate(3, 0, "3", 10).unwrap();
        assert_that!(page.items, container_eq(vec![3, 4, 5]));
        assert_that!(page.next_page_token, eq("6"));

        let page = paginate(3, 0, "9", 10).unwrap();
        assert_that!(page.items, container_eq(vec![9]));
        assert_that!(page.next_page_token, eq(""));
    }

    #[test]
    fn override_wins_over_page_size() {
        let page = paginate(3, 5, "", 10).unwrap();
        assert_that!(page.items, container_eq(vec![0, 1, 2, 3, 4]));
        assert_that!(page.next_page_token, eq("5"));
    }

    #[test]
    fn zero_effective_size_returns_the_rest() {
        let page = paginate(0, 0, "4", 10).unwrap();
        assert_that!(page.items, container_eq((4..10).collect::<Vec<_>>()));
        assert_that!(page.next_page_token, eq(""));
    }

    #[test]
    fn token_at_max_response_yields_an_empty_final_page() {
        let page = paginate(3, 0, "10", 10).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.next_page_token, "");
    }

    #[test]
    fn invalid_arguments_are_rejected() {
        assert!(matches!(
            paginate(-1, 0, "", 10),
            Err(PaginationError::NegativePageSize)
        ));
        assert!(matches!(
            paginate(0, -1, "", 10),
            Err(PaginationError::NegativePageSize)
        ));
        assert!(matches!(
            paginate(3, 0, "", 0),
            Err(PaginationError::NonPositiveMaxResponse)
        ));
        for token in ["not-a-number", "-1", "11", "3.5"] {
            assert!(matches!(
                paginate(3, 0, token, 10),
                Err(PaginationError::InvalidPageToken(_))
            ));
        }
    }

    #[test]
    fn identical_inputs_yield_identical_pages() {
        let first = paginate(4, 0, "2", 9).unwrap();
        let second = paginate(4, 0, "2", 9).unwrap();
        assert_eq!(first, second);
    }
}
