//! Backward pagination over `returnTradeHistory`
//!
//! The endpoint returns a bounded page of the most recent trades inside
//! `[start, end]`. To cover the whole window the cursor (`end`) is walked
//! backwards to one second before the oldest trade of each page:
//!
//! 1. query `[start, cursor]` and sort the page by `date`, newest first
//! 2. an empty page ends the walk
//! 3. otherwise emit the page and set `cursor = oldest - 1`
//! 4. stop once `cursor <= start`, which also covers a cursor that fails to
//!    move on a stale response
//!
//! [`TradePages`] yields one page per request; [`collect_pages`] drains it
//! into a single newest-first list.

use std::iter::FusedIterator;

use tracing::debug;

use super::command::Command;
use super::error::ApiResult;
use super::executor::Executor;
use super::transport::Transport;
use super::types::Trade;

pub(crate) const TRADE_HISTORY: &str = "returnTradeHistory";

pub(crate) fn trade_history_command(pair: &str, start: i64, end: i64) -> Command {
    Command::legacy(TRADE_HISTORY)
        .param("currencyPair", pair)
        .param("start", start)
        .param("end", end)
}

/// Lazy, single-pass sequence of trade-history pages, newest page first.
///
/// Each call to `next` performs exactly one request. Dropping the iterator
/// stops the walk. After the last page, or after an error has been yielded,
/// it returns `None` for good.
pub struct TradePages<'a, T> {
    executor: &'a Executor<T>,
    pair: String,
    start: i64,
    cursor: i64,
    finished: bool,
}

impl<'a, T: Transport> TradePages<'a, T> {
    /// `start` and `end` are epoch seconds
    pub(crate) fn new(executor: &'a Executor<T>, pair: &str, start: i64, end: i64) -> Self {
        Self {
            executor,
            pair: pair.to_string(),
            start,
            cursor: end,
            finished: false,
        }
    }

    /// Current upper bound of the query window, epoch seconds
    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn fetch_page(&self) -> ApiResult<Vec<Trade>> {
        let command = trade_history_command(&self.pair, self.start, self.cursor);
        let mut page: Vec<Trade> = self.executor.execute_as(&command)?;
        page.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(page)
    }
}

impl<T: Transport> Iterator for TradePages<'_, T> {
    type Item = ApiResult<Vec<Trade>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        debug!(
            "Download {} trades from {} to {}",
            self.pair, self.start, self.cursor
        );

        let page = match self.fetch_page() {
            Ok(page) => page,
            Err(e) => {
                self.finished = true;
                return Some(Err(e));
            }
        };

        let (Some(newest), Some(oldest)) = (page.first(), page.last()) else {
            debug!("Empty page, trade history complete");
            self.finished = true;
            return None;
        };

        debug!(
            "Page of {} trades, newest {} oldest {}",
            page.len(),
            newest.date,
            oldest.date
        );

        let next_cursor = oldest.epoch_secs() - 1;
        if next_cursor <= self.start {
            debug!("Cursor {} reached start {}, done", next_cursor, self.start);
            self.finished = true;
        } else {
            debug!("New end: {}", next_cursor);
            self.cursor = next_cursor;
        }

        Some(Ok(page))
    }
}

impl<T: Transport> FusedIterator for TradePages<'_, T> {}

/// Drain a page sequence into one list, newest trade first.
/// The first error aborts the collection.
pub fn collect_pages<I>(pages: I) -> ApiResult<Vec<Trade>>
where
    I: IntoIterator<Item = ApiResult<Vec<Trade>>>,
{
    let mut trades = Vec::new();
    for page in pages {
        trades.extend(page?);
    }
    Ok(trades)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::poloniex::dates::parse_date;
    use crate::poloniex::error::ApiError;
    use crate::poloniex::executor::tests::ScriptedTransport;

    fn trade(id: u64, date: &str) -> String {
        format!(
            r#"{{"globalTradeID": {id}, "tradeID": {id}, "date": "{date}", "type": "buy",
                "rate": "0.1", "amount": "1", "total": "0.1", "orderNumber": {id}}}"#
        )
    }

    fn page(trades: &[String]) -> String {
        format!("[{}]", trades.join(","))
    }

    fn executor(transport: ScriptedTransport) -> Executor<ScriptedTransport> {
        Executor::with_transport(transport, ClientConfig::default())
    }

    fn ts(date: &str) -> i64 {
        parse_date(date).unwrap()
    }

    fn three_page_script() -> ScriptedTransport {
        ScriptedTransport::new()
            .reply(page(&[
                trade(3, "2021-01-03 00:00:00"),
                trade(2, "2021-01-02 00:00:00"),
            ]))
            .reply(page(&[trade(1, "2021-01-01 00:00:00")]))
            .reply("[]")
    }

    #[test]
    fn test_eager_collects_all_pages_newest_first() {
        let exec = executor(three_page_script());
        let start = ts("2020-12-31 00:00:00");
        let end = ts("2021-01-04 00:00:00");

        let trades = collect_pages(TradePages::new(&exec, "USDT_BTC", start, end)).unwrap();

        let ids: Vec<u64> = trades.iter().map(|t| t.trade_id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert!(trades.windows(2).all(|w| w[0].date >= w[1].date));
        assert_eq!(exec.transport().request_count(), 3);
    }

    #[test]
    fn test_cursor_walks_back_one_second_before_oldest() {
        let exec = executor(three_page_script());
        let start = ts("2020-12-31 00:00:00");
        let end = ts("2021-01-04 00:00:00");

        collect_pages(TradePages::new(&exec, "USDT_BTC", start, end)).unwrap();

        let requests = exec.transport().requests.borrow();
        assert!(requests[0].ends_with(&format!(
            "returnTradeHistory&currencyPair=USDT_BTC&start={}&end={}",
            start, end
        )));
        assert!(requests[1].ends_with(&format!("&end={}", ts("2021-01-02 00:00:00") - 1)));
        assert!(requests[2].ends_with(&format!("&end={}", ts("2021-01-01 00:00:00") - 1)));
    }

    #[test]
    fn test_pages_are_resorted_newest_first() {
        let exec = executor(
            ScriptedTransport::new()
                .reply(page(&[
                    trade(1, "2021-01-01 00:00:00"),
                    trade(3, "2021-01-03 00:00:00"),
                    trade(2, "2021-01-02 00:00:00"),
                ]))
                .reply("[]"),
        );
        let mut pages = TradePages::new(&exec, "USDT_BTC", 0, ts("2021-01-04 00:00:00"));

        let first = pages.next().unwrap().unwrap();
        let ids: Vec<u64> = first.iter().map(|t| t.trade_id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(pages.cursor(), ts("2021-01-01 00:00:00") - 1);
    }

    #[test]
    fn test_empty_first_page() {
        let exec = executor(ScriptedTransport::new().reply("[]"));
        let trades = collect_pages(TradePages::new(&exec, "USDT_BTC", 0, 100)).unwrap();
        assert!(trades.is_empty());

        let exec = executor(ScriptedTransport::new().reply("[]"));
        let mut pages = TradePages::new(&exec, "USDT_BTC", 0, 100);
        assert!(pages.next().is_none());
        assert!(pages.is_finished());
        assert_eq!(exec.transport().request_count(), 1);
    }

    #[test]
    fn test_stops_when_cursor_does_not_pass_start() {
        // Oldest trade one second after start: cursor lands on start, so no second query
        let start = ts("2021-01-01 00:00:00");
        let exec = executor(
            ScriptedTransport::new()
                .reply(page(&[trade(1, "2021-01-01 00:00:01")]))
                .reply(page(&[trade(0, "2020-12-31 23:59:59")])),
        );

        let trades =
            collect_pages(TradePages::new(&exec, "USDT_BTC", start, start + 3600)).unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(exec.transport().request_count(), 1);
    }

    #[test]
    fn test_stale_response_does_not_loop() {
        // Server ignores the window and keeps returning trades older than start
        let start = ts("2021-01-02 00:00:00");
        let stale = page(&[trade(9, "2021-01-01 00:00:00")]);
        let exec = executor(
            ScriptedTransport::new()
                .reply(stale.clone())
                .reply(stale.clone())
                .reply(stale),
        );

        let trades =
            collect_pages(TradePages::new(&exec, "USDT_BTC", start, start + 86_400)).unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(exec.transport().request_count(), 1);
    }

    #[test]
    fn test_start_after_end_still_queries_once() {
        let exec = executor(
            ScriptedTransport::new().reply(page(&[trade(1, "2021-01-01 00:00:00")])),
        );
        let start = ts("2021-02-01 00:00:00");
        let end = ts("2021-01-15 00:00:00");

        let pages: Vec<_> = TradePages::new(&exec, "USDT_BTC", start, end).collect();
        assert_eq!(pages.len(), 1);
        assert_eq!(exec.transport().request_count(), 1);
    }

    #[test]
    fn test_lazy_early_stop_issues_no_further_requests() {
        let exec = executor(three_page_script());
        let start = ts("2020-12-31 00:00:00");
        let end = ts("2021-01-04 00:00:00");

        let first: Vec<_> = TradePages::new(&exec, "USDT_BTC", start, end).take(1).collect();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].as_ref().unwrap().len(), 2);
        assert_eq!(exec.transport().request_count(), 1);
    }

    #[test]
    fn test_lazy_yields_pages_in_order() {
        let exec = executor(three_page_script());
        let start = ts("2020-12-31 00:00:00");
        let end = ts("2021-01-04 00:00:00");

        let sizes: Vec<usize> = TradePages::new(&exec, "USDT_BTC", start, end)
            .map(|p| p.unwrap().len())
            .collect();
        assert_eq!(sizes, vec![2, 1]);
    }

    #[test]
    fn test_error_is_yielded_once_then_fused() {
        let exec = executor(
            ScriptedTransport::new()
                .reply(page(&[trade(2, "2021-01-02 00:00:00")]))
                .reply(r#"{"error": "Please do not make more than 8 API calls per second."}"#),
        );
        let mut pages = TradePages::new(&exec, "USDT_BTC", 0, ts("2021-01-03 00:00:00"));

        assert!(pages.next().unwrap().is_ok());
        match pages.next().unwrap() {
            Err(ApiError::Server { command, .. }) => {
                assert!(command.starts_with("returnTradeHistory&currencyPair=USDT_BTC"))
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(pages.next().is_none());
        assert_eq!(exec.transport().request_count(), 2);
    }

    #[test]
    fn test_eager_propagates_error() {
        let exec = executor(
            ScriptedTransport::new()
                .reply(page(&[trade(2, "2021-01-02 00:00:00")]))
                .fail("connection reset"),
        );
        let err = collect_pages(TradePages::new(&exec, "USDT_BTC", 0, ts("2021-01-03 00:00:00")))
            .unwrap_err();
        assert!(matches!(err, ApiError::Request { .. }));
    }
}
