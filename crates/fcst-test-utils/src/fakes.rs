use fcst_core::{
    CollaboratorError, ExportArtifact, Exporter, ImportOutcome, Importer, ListParams,
    ListResponse, RecordSource, RowError,
};
use fcst_record::{EntitySchema, FieldName, Record};
use parking_lot::Mutex;
use serde_json::Value;

/// List endpoint over a fixed set of JSON rows; ignores filters
#[derive(Debug, Default)]
pub struct MemorySource {
    rows: Vec<Value>,
    failure: Option<CollaboratorError>,
    requests: Mutex<Vec<(String, ListParams)>>,
}

impl MemorySource {
    pub fn new(rows: Vec<Value>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn failing(error: CollaboratorError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Entity and params of every request received
    pub fn requests(&self) -> Vec<(String, ListParams)> {
        self.requests.lock().clone()
    }
}

#[async_trait::async_trait]
impl RecordSource for MemorySource {
    async fn list(
        &self,
        entity: &str,
        params: &ListParams,
    ) -> Result<ListResponse<Value>, CollaboratorError> {
        self.requests
            .lock()
            .push((entity.to_string(), params.clone()));
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        Ok(fcst_grid::page(&self.rows, params.page, params.size).into())
    }
}

/// Exports rows as a JSON array of objects, key first
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonExporter;

#[async_trait::async_trait]
impl Exporter for JsonExporter {
    async fn export(
        &self,
        records: &[&Record],
        fields: &[FieldName],
    ) -> Result<ExportArtifact, CollaboratorError> {
        let rows: Vec<Value> = records
            .iter()
            .map(|record| {
                let mut object = serde_json::Map::new();
                object.insert("key".into(), Value::String(record.key().to_string()));
                for field in fields {
                    let value = serde_json::to_value(record.value(field.as_str()))
                        .unwrap_or(Value::Null);
                    object.insert(field.to_string(), value);
                }
                Value::Object(object)
            })
            .collect();
        let bytes =
            serde_json::to_vec(&rows).map_err(|e| CollaboratorError::Format(e.to_string()))?;
        Ok(ExportArtifact {
            file_name: "export.json".into(),
            content_type: "application/json".into(),
            bytes,
        })
    }
}

/// Reads a JSON array of row objects
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonImporter;

#[async_trait::async_trait]
impl Importer for JsonImporter {
    async fn import(
        &self,
        schema: &EntitySchema,
        blob: &[u8],
    ) -> Result<ImportOutcome, CollaboratorError> {
        let rows: Vec<Value> =
            serde_json::from_slice(blob).map_err(|e| CollaboratorError::Format(e.to_string()))?;
        let mut outcome = ImportOutcome::default();
        for (row, value) in rows.into_iter().enumerate() {
            match Record::from_json(schema, value) {
                Ok(record) => outcome.records.push(record),
                Err(e) => outcome.errors.push(RowError::new(row, e.to_string())),
            }
        }
        Ok(outcome)
    }
}
