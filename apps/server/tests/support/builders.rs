use axum::body::Bytes;
use coverage_catalog::models::{NewProcedureCode, NewProduct};

pub fn to_json_body(value: &serde_json::Value) -> anyhow::Result<Bytes> {
    Ok(Bytes::from(serde_json::to_vec(value)?))
}

/// Builder for product rows
pub struct ProductBuilder {
    product: NewProduct,
}

impl ProductBuilder {
    /// Starts from a fully populated active product; `code` also seeds the API plan code.
    pub fn new(code: &str) -> Self {
        Self {
            product: NewProduct {
                product_code: code.to_string(),
                plan_name: "BASICO".to_string(),
                ans_plan_code: format!("4{code}"),
                ans_registered_name: format!("PRODUTO {code}"),
                segment: "AMBULATORIAL + HOSPITALAR COM OBSTETRICIA".to_string(),
                classification: "COLETIVO EMPRESARIAL".to_string(),
                operator_code: "006246".to_string(),
                operator_name: "SUL AMERICA COMPANHIA DE SEGURO SAUDE".to_string(),
                status: "ATIVO".to_string(),
                api_product_code: format!("P{code}"),
                api_plan_code: format!("API{code}"),
            },
        }
    }

    pub fn plan_name(mut self, value: &str) -> Self {
        self.product.plan_name = value.to_string();
        self
    }

    pub fn ans_plan_code(mut self, value: &str) -> Self {
        self.product.ans_plan_code = value.to_string();
        self
    }

    pub fn ans_registered_name(mut self, value: &str) -> Self {
        self.product.ans_registered_name = value.to_string();
        self
    }

    pub fn segment(mut self, value: &str) -> Self {
        self.product.segment = value.to_string();
        self
    }

    pub fn classification(mut self, value: &str) -> Self {
        self.product.classification = value.to_string();
        self
    }

    pub fn status(mut self, value: &str) -> Self {
        self.product.status = value.to_string();
        self
    }

    pub fn operator_name(mut self, value: &str) -> Self {
        self.product.operator_name = value.to_string();
        self
    }

    pub fn api_plan_code(mut self, value: &str) -> Self {
        self.product.api_plan_code = value.to_string();
        self
    }

    pub fn build(self) -> NewProduct {
        self.product
    }
}

pub fn procedure(code: &str, description: &str) -> NewProcedureCode {
    NewProcedureCode {
        code: code.to_string(),
        description: description.to_string(),
    }
}
