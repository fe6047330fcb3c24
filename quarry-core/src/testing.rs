//! Recording connection used by unit tests

use crate::bind::BindValue;
use crate::executor::{Connection, PreparedStatement};
use crate::{Error, Result, Row};
use std::collections::VecDeque;

/// One prepared statement as seen by the connection
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub sql: String,
    pub bindings: Vec<(usize, BindValue)>,
}

/// Connection that records every statement and replays scripted results
#[derive(Debug)]
pub struct MockConnection {
    calls: Vec<Call>,
    results: VecDeque<Vec<Row>>,
    affected: u64,
    next_insert_id: i64,
    last_insert_id: Option<i64>,
    failure: Option<String>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            results: VecDeque::new(),
            affected: 1,
            next_insert_id: 1,
            last_insert_id: None,
            failure: None,
        }
    }

    pub fn with_affected(mut self, affected: u64) -> Self {
        self.affected = affected;
        self
    }

    /// Queue the rows returned by the next fetch
    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.results.push_back(rows);
        self
    }

    pub fn with_next_insert_id(mut self, id: i64) -> Self {
        self.next_insert_id = id;
        self
    }

    /// Never generate an identity on INSERT
    pub fn without_insert_ids(mut self) -> Self {
        self.next_insert_id = 0;
        self
    }

    /// Fail every execution with the given driver message
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn only_call(&self) -> &Call {
        assert_eq!(self.calls.len(), 1, "expected exactly one call: {:?}", self.calls);
        &self.calls[0]
    }

    fn run(&mut self) -> Result<()> {
        match &self.failure {
            Some(message) => Err(Error::execution(message.clone())),
            None => Ok(()),
        }
    }
}

pub struct MockStatement<'c> {
    conn: &'c mut MockConnection,
    index: usize,
}

impl Connection for MockConnection {
    type Statement<'c> = MockStatement<'c> where Self: 'c;

    fn prepare<'c>(&'c mut self, sql: &str) -> Result<Self::Statement<'c>> {
        self.calls.push(Call {
            sql: sql.to_string(),
            bindings: Vec::new(),
        });
        let index = self.calls.len() - 1;
        Ok(MockStatement { conn: self, index })
    }

    fn last_insert_id(&mut self) -> Result<Option<i64>> {
        Ok(self.last_insert_id)
    }
}

impl PreparedStatement for MockStatement<'_> {
    fn bind(&mut self, position: usize, value: BindValue) -> Result<()> {
        self.conn.calls[self.index].bindings.push((position, value));
        Ok(())
    }

    fn execute(&mut self) -> Result<u64> {
        self.conn.run()?;
        if self.conn.calls[self.index].sql.starts_with("INSERT") && self.conn.next_insert_id > 0 {
            self.conn.last_insert_id = Some(self.conn.next_insert_id);
            self.conn.next_insert_id += 1;
        }
        Ok(self.conn.affected)
    }

    fn fetch_rows(&mut self) -> Result<Vec<Row>> {
        self.conn.run()?;
        Ok(self.conn.results.pop_front().unwrap_or_default())
    }
}
