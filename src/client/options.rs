//! 選択肢 (国道・郡・市・通り) の取得と名前解決

use std::collections::BTreeMap;

use tracing::debug;

use super::Client;
use crate::error::CdsError;
use crate::form::{FieldId, FormFieldSet};
use crate::traits::Transport;

/// コード -> ラベル
pub type CodeMap = BTreeMap<String, String>;

fn options_of(fields: &FormFieldSet, id: FieldId) -> CodeMap {
    fields
        .get(id)
        .options
        .iter()
        .filter(|(_, code)| !code.is_empty())
        .map(|(label, code)| (code.to_string(), label.to_string()))
        .collect()
}

/// コード完全一致 → ラベル完全一致 → ラベル前方一致 (大文字小文字無視) の順
fn resolve(map: &CodeMap, kind: &str, query: &str) -> Result<(String, String), CdsError> {
    let query = query.trim();
    if let Some(label) = map.get(query) {
        return Ok((query.to_string(), label.clone()));
    }
    let lower = query.to_lowercase();
    let found = map
        .iter()
        .find(|(_, label)| label.to_lowercase() == lower)
        .or_else(|| {
            map.iter()
                .find(|(_, label)| label.to_lowercase().starts_with(&lower))
        });
    match found {
        Some((code, label)) if !query.is_empty() => Ok((code.clone(), label.clone())),
        _ => Err(CdsError::NotFound {
            kind: kind.to_string(),
            query: query.to_string(),
        }),
    }
}

impl<T: Transport> Client<T> {
    /// 国道一覧 (値は `番号,枝番,開始マイル,終了マイル`)
    pub async fn highways(&mut self) -> Result<CodeMap, CdsError> {
        if let Some(cached) = &self.highways {
            return Ok(cached.clone());
        }
        self.reset_form_fields().await?;
        let highways = options_of(&self.fields, FieldId::HighwaysHighway);
        debug!("Loaded {} highways", highways.len());
        self.highways = Some(highways.clone());
        Ok(highways)
    }

    pub async fn counties(&mut self) -> Result<CodeMap, CdsError> {
        if let Some(cached) = &self.counties {
            return Ok(cached.clone());
        }
        self.reset_form_fields().await?;
        let counties = options_of(&self.fields, FieldId::LocalRoadsCounty);
        debug!("Loaded {} counties", counties.len());
        self.counties = Some(counties.clone());
        Ok(counties)
    }

    /// 全市一覧 (All Roads タブで管轄を市にした時の選択肢)
    pub async fn cities(&mut self) -> Result<CodeMap, CdsError> {
        if let Some(cached) = &self.cities {
            return Ok(cached.clone());
        }
        self.reset_form_fields().await?;
        self.update_field(FieldId::AllRoadsJurisdiction, "City")
            .await?;
        let cities = options_of(&self.fields, FieldId::AllRoadsCity);
        debug!("Loaded {} cities", cities.len());
        self.cities = Some(cities.clone());
        Ok(cities)
    }

    /// 郡・市の通り一覧
    ///
    /// `city` で始まる市 (例: "Portland" と "Portland (Airport)") はまとめて取得する。
    pub async fn streets(&mut self, county: &str, city: &str) -> Result<CodeMap, CdsError> {
        self.reset_form_fields().await?;
        self.update_field(FieldId::LocalRoadsCounty, county).await?;

        let matching: Vec<String> = self
            .fields
            .get(FieldId::LocalRoadsCity)
            .options
            .iter()
            .filter(|(label, code)| !code.is_empty() && (label.starts_with(city) || *code == city))
            .map(|(_, code)| code.to_string())
            .collect();
        if matching.is_empty() {
            return Err(CdsError::NotFound {
                kind: "City".to_string(),
                query: city.to_string(),
            });
        }

        let mut streets = CodeMap::new();
        for code in matching {
            self.update_field(FieldId::LocalRoadsCity, code).await?;
            streets.extend(options_of(&self.fields, FieldId::LocalRoadsStreet));
        }
        debug!("Loaded {} streets for {} / {}", streets.len(), county, city);
        Ok(streets)
    }

    /// 郡名またはコードから (コード, 名称) を得る
    pub async fn resolve_county(&mut self, query: &str) -> Result<(String, String), CdsError> {
        let counties = self.counties().await?;
        resolve(&counties, "County", query)
    }

    pub async fn resolve_city(&mut self, query: &str) -> Result<(String, String), CdsError> {
        let cities = self.cities().await?;
        resolve(&cities, "City", query)
    }

    pub async fn resolve_highway(&mut self, query: &str) -> Result<(String, String), CdsError> {
        let highways = self.highways().await?;
        resolve(&highways, "Highway", query)
    }

    pub async fn resolve_street(
        &mut self,
        county: &str,
        city: &str,
        query: &str,
    ) -> Result<(String, String), CdsError> {
        let streets = self.streets(county, city).await?;
        resolve(&streets, "Street", query)
    }
}
