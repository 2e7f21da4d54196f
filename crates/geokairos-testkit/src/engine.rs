use geo::BoundingRect;
use geokairos_geometry::{geometry_to_wkb, Geometry};
use geokairos_types::{Connection, ConnectionError, ResultSet, Row, Savepoint, SqlValue};
use log::debug;
use regex::Regex;

use crate::statement::{Literal, Statement};
use crate::{CatalogRow, DeclaredColumn, EngineState, SpatialIndex, TransactionManager};

/// Something the engine was asked to do, in order
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Statement(String),
    AutoCommit(bool),
    Commit,
    Rollback,
    Savepoint(String),
    RollbackToSavepoint(String),
    ReleaseSavepoint(String),
}

/// An in-memory engine session
#[derive(Debug)]
pub struct MemoryEngine {
    state: EngineState,
    transactions: TransactionManager,
    auto_commit: bool,
    last_value: Option<i64>,
    server_version: Option<(u32, u32)>,
    faults: Vec<Regex>,
    events: Vec<EngineEvent>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        MemoryEngine {
            state: EngineState::default(),
            transactions: TransactionManager::new(),
            auto_commit: true,
            last_value: None,
            server_version: Some((5, 0)),
            faults: Vec::new(),
            events: Vec::new(),
        }
    }

    // Seeding

    /// Make a table known to `ST_EXTENT` without giving it any geometry
    pub fn create_table(&mut self, table: &str) {
        self.state.tables.entry(table.to_string()).or_default();
    }

    pub fn insert_geometry(&mut self, table: &str, column: &str, geometry: Geometry) {
        self.state.insert_geometry(table, column, geometry);
    }

    pub fn register_geometry_column(&mut self, row: CatalogRow) {
        self.state.geometry_columns.push(row);
    }

    pub fn declare_column_type(&mut self, schema: Option<&str>, table: &str, column: &str, udt_name: &str) {
        self.state.declared_columns.push(DeclaredColumn {
            schema: schema.map(str::to_string),
            table: table.to_string(),
            column: column.to_string(),
            udt_name: udt_name.to_string(),
        });
    }

    pub fn create_sequence(&mut self, name: &str) {
        self.state.sequences.insert(name.to_string(), 0);
    }

    /// `None` makes `server_version` fail
    pub fn set_server_version(&mut self, version: Option<(u32, u32)>) {
        self.server_version = version;
    }

    /// Fail every statement matching `pattern` from now on
    pub fn fail_on(&mut self, pattern: &str) -> Result<(), regex::Error> {
        self.faults.push(Regex::new(pattern)?);
        Ok(())
    }

    pub fn clear_faults(&mut self) {
        self.faults.clear();
    }

    // Inspection

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn catalog_rows(&self) -> &[CatalogRow] {
        &self.state.geometry_columns
    }

    pub fn has_sequence(&self, name: &str) -> bool {
        self.state.sequences.contains_key(name)
    }

    pub fn spatial_index(&self, name: &str) -> Option<&SpatialIndex> {
        self.state.indexes.get(name)
    }

    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    /// SQL text of every statement run, failed ones included
    pub fn statements(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                EngineEvent::Statement(sql) => Some(sql.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn commit_count(&self) -> usize {
        self.events.iter().filter(|event| matches!(event, EngineEvent::Commit)).count()
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    pub fn in_transaction(&self) -> bool {
        self.transactions.in_transaction()
    }

    pub fn outstanding_savepoints(&self) -> usize {
        self.transactions.outstanding_savepoints()
    }

    fn run(&mut self, sql: &str) -> Result<(ResultSet, u64), ConnectionError> {
        debug!("{}", sql);
        self.events.push(EngineEvent::Statement(sql.to_string()));

        if self.faults.iter().any(|fault| fault.is_match(sql)) {
            return Err(ConnectionError::Sql(format!("injected failure: {}", sql)));
        }

        let statement = Statement::parse(sql)?;
        // Statements validate before mutating, so a failed statement leaves
        // the state untouched even in auto-commit mode
        match statement {
            Statement::SelectCatalog { field, predicates } => {
                let rows = self
                    .state
                    .geometry_columns
                    .iter()
                    .filter(|row| row.matches(&predicates))
                    .map(|row| catalog_value(row, &field).map(|value| Row::new(vec![value])))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((ResultSet::new(vec![field], rows), 0))
            }
            Statement::DeleteCatalog { predicates } => {
                let before = self.state.geometry_columns.len();
                self.state.geometry_columns.retain(|row| !row.matches(&predicates));
                Ok((ResultSet::default(), (before - self.state.geometry_columns.len()) as u64))
            }
            Statement::InsertCatalog { columns, values } => {
                let row = catalog_row(&columns, &values)?;
                self.state.geometry_columns.push(row);
                Ok((ResultSet::default(), 1))
            }
            Statement::CreateSpatialIndex { name, table, column } => {
                if self.state.indexes.contains_key(&name) {
                    return Err(ConnectionError::Sql(format!("index {} already exists", name)));
                }
                let index = SpatialIndex::bulk_load(&table, &column, self.state.geometries(&table, &column));
                self.state.indexes.insert(name, index);
                Ok((ResultSet::default(), 0))
            }
            Statement::CreateSequence { name } => {
                if self.state.sequences.contains_key(&name) {
                    return Err(ConnectionError::Sql(format!("sequence {} already exists", name)));
                }
                self.state.sequences.insert(name, 0);
                Ok((ResultSet::default(), 0))
            }
            Statement::DropSequence { name } => match self.state.sequences.remove(&name) {
                Some(_) => Ok((ResultSet::default(), 0)),
                None => Err(ConnectionError::Sql(format!("sequence {} does not exist", name))),
            },
            Statement::LookupSequence { name } => {
                let rows = if self.state.sequences.contains_key(&name) {
                    vec![Row::new(vec![SqlValue::Varchar(name)])]
                } else {
                    Vec::new()
                };
                Ok((ResultSet::new(vec!["seqname".to_string()], rows), 0))
            }
            Statement::NextValue { sequence } => {
                let value = self
                    .state
                    .sequences
                    .get_mut(&sequence)
                    .ok_or_else(|| ConnectionError::Sql(format!("sequence {} does not exist", sequence)))?;
                *value += 1;
                let next = *value;
                self.last_value = Some(next);
                Ok((ResultSet::new(vec!["NEXTVAL".to_string()], vec![Row::new(vec![SqlValue::Bigint(next)])]), 0))
            }
            Statement::LastValue => {
                let rows = self.last_value.map(|v| Row::new(vec![SqlValue::Bigint(v)])).into_iter().collect();
                Ok((ResultSet::new(vec!["lastval".to_string()], rows), 0))
            }
            Statement::Extent { table, column } => {
                if !self.state.tables.contains_key(&table) {
                    return Err(ConnectionError::Sql(format!("relation {} does not exist", table)));
                }
                let extent = extent_wkb(self.state.geometries(&table, &column));
                Ok((ResultSet::new(vec!["extent".to_string()], vec![Row::new(vec![extent])]), 0))
            }
            Statement::DeclaredType { predicates } => {
                let rows = self
                    .state
                    .declared_columns
                    .iter()
                    .filter(|column| column.matches(&predicates))
                    .map(|column| Row::new(vec![SqlValue::Varchar(column.udt_name.clone())]))
                    .collect();
                Ok((ResultSet::new(vec!["udt_name".to_string()], rows), 0))
            }
        }
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Connection for MemoryEngine {
    fn query(&mut self, sql: &str) -> Result<ResultSet, ConnectionError> {
        self.run(sql).map(|(rs, _)| rs)
    }

    fn execute(&mut self, sql: &str) -> Result<u64, ConnectionError> {
        self.run(sql).map(|(_, count)| count)
    }

    fn auto_commit(&self) -> bool {
        self.auto_commit
    }

    /// Turning auto-commit back on commits the open transaction
    fn set_auto_commit(&mut self, auto_commit: bool) -> Result<(), ConnectionError> {
        self.events.push(EngineEvent::AutoCommit(auto_commit));
        if auto_commit == self.auto_commit {
            return Ok(());
        }
        if auto_commit {
            self.transactions.commit()?;
        } else {
            self.transactions.begin(&self.state)?;
        }
        self.auto_commit = auto_commit;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), ConnectionError> {
        self.events.push(EngineEvent::Commit);
        if self.auto_commit {
            return Err(ConnectionError::Transaction("commit with auto-commit enabled".to_string()));
        }
        self.transactions.commit()?;
        self.transactions.begin(&self.state)
    }

    fn rollback(&mut self) -> Result<(), ConnectionError> {
        self.events.push(EngineEvent::Rollback);
        if self.auto_commit {
            return Err(ConnectionError::Transaction("rollback with auto-commit enabled".to_string()));
        }
        self.transactions.rollback(&mut self.state)?;
        self.transactions.begin(&self.state)
    }

    fn set_savepoint(&mut self) -> Result<Savepoint, ConnectionError> {
        let savepoint = self.transactions.create_savepoint(&self.state)?;
        self.events.push(EngineEvent::Savepoint(savepoint.name.clone()));
        Ok(savepoint)
    }

    fn rollback_to_savepoint(&mut self, savepoint: &Savepoint) -> Result<(), ConnectionError> {
        self.events.push(EngineEvent::RollbackToSavepoint(savepoint.name.clone()));
        self.transactions.rollback_to_savepoint(savepoint, &mut self.state)
    }

    fn release_savepoint(&mut self, savepoint: Savepoint) -> Result<(), ConnectionError> {
        self.events.push(EngineEvent::ReleaseSavepoint(savepoint.name.clone()));
        self.transactions.release_savepoint(&savepoint)
    }

    fn server_version(&self) -> Result<(u32, u32), ConnectionError> {
        self.server_version
            .ok_or_else(|| ConnectionError::Unsupported("server version unavailable".to_string()))
    }
}

fn catalog_value(row: &CatalogRow, field: &str) -> Result<SqlValue, ConnectionError> {
    match field {
        "SRID" => Ok(integer_value(row.srid)),
        "COORD_DIMENSION" => Ok(integer_value(row.dimension)),
        _ => match row.text(field) {
            Some(text) => Ok(SqlValue::Varchar(text)),
            None if field == "F_TABLE_SCHEMA" => Ok(SqlValue::Null),
            None => Err(ConnectionError::Sql(format!("unknown column {}", field))),
        },
    }
}

/// INTEGER when the value fits, BIGINT otherwise
fn integer_value(value: i64) -> SqlValue {
    i32::try_from(value).map(SqlValue::Integer).unwrap_or(SqlValue::Bigint(value))
}

fn catalog_row(columns: &[String], values: &[Literal]) -> Result<CatalogRow, ConnectionError> {
    if columns.len() != values.len() {
        return Err(ConnectionError::Sql(format!(
            "{} columns but {} values",
            columns.len(),
            values.len()
        )));
    }
    let mut row = CatalogRow::new(None, "", "", -1, "GEOMETRY");
    for (column, value) in columns.iter().zip(values) {
        match (column.as_str(), value) {
            ("F_TABLE_CATALOG", Literal::Text(v)) => row.catalog = v.clone(),
            ("F_TABLE_SCHEMA", Literal::Text(v)) => row.schema = Some(v.clone()),
            ("F_TABLE_SCHEMA", Literal::Null) => row.schema = None,
            ("F_TABLE_NAME", Literal::Text(v)) => row.table = v.clone(),
            ("F_GEOMETRY_COLUMN", Literal::Text(v)) => row.column = v.clone(),
            ("COORD_DIMENSION", Literal::Integer(v)) => row.dimension = *v,
            ("SRID", Literal::Integer(v)) => row.srid = *v,
            ("F_GEOMETRY_TYPE", Literal::Text(v)) => row.geometry_type = v.clone(),
            (column, value) => {
                return Err(ConnectionError::Sql(format!("bad value {:?} for {}", value, column)))
            }
        }
    }
    if row.table.is_empty() || row.column.is_empty() {
        return Err(ConnectionError::Sql("F_TABLE_NAME and F_GEOMETRY_COLUMN are required".to_string()));
    }
    Ok(row)
}

/// Extent of the geometries as a WKB polygon; NULL when there are none
fn extent_wkb(geometries: &[Geometry]) -> SqlValue {
    let collection: geo::GeometryCollection<f64> =
        geometries.iter().map(Geometry::to_geo).collect();
    match collection.bounding_rect() {
        Some(rect) => {
            let (min, max) = (rect.min(), rect.max());
            let outline = vec![(min.x, min.y), (max.x, min.y), (max.x, max.y), (min.x, max.y), (min.x, min.y)];
            SqlValue::Binary(geometry_to_wkb(&Geometry::Polygon { rings: vec![outline] }))
        }
        None => SqlValue::Null,
    }
}
