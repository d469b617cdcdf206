use super::builders::{procedure, ProductBuilder};
use coverage_catalog::models::{NewProcedureCode, NewProduct};

/// Three "Basico" products and two "Premium" ones, in insertion order P1..P5.
pub fn basico_premium_products() -> Vec<NewProduct> {
    vec![
        ProductBuilder::new("P1").plan_name("Basico").segment("AMBULATORIAL").build(),
        ProductBuilder::new("P2").plan_name("Basico").segment("HOSPITALAR").build(),
        ProductBuilder::new("P3").plan_name("Basico").segment("AMBULATORIAL").build(),
        ProductBuilder::new("P4")
            .plan_name("Premium")
            .segment("AMBULATORIAL")
            .status("INATIVO")
            .build(),
        ProductBuilder::new("P5").plan_name("Premium").segment("HOSPITALAR").build(),
    ]
}

/// `n` products with codes `001..n`, all on the same plan.
pub fn numbered_products(n: usize) -> Vec<NewProduct> {
    (1..=n)
        .map(|i| ProductBuilder::new(&format!("{i:03}")).build())
        .collect()
}

pub fn sample_procedure_codes() -> Vec<NewProcedureCode> {
    vec![
        procedure("10101012", "CONSULTA EM CONSULTORIO (NO HORARIO NORMAL OU PREESTABELECIDO)"),
        procedure("10101039", "CONSULTA EM PRONTO SOCORRO"),
        procedure("45678", "EXAME DE SANGUE"),
        procedure("04567", "EXAME DE URINA"),
        procedure("99999", "RADIOGRAFIA 456 INCIDENCIAS"),
        procedure("40301630", "Dosagem de 50% da hemoglobina"),
    ]
}
