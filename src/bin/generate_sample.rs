use anyhow::{Context, Result};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

const HEADERS: [&str; 6] = [
    "Cidade do comprador",
    "Título",
    "Estado do pagamento",
    "Preço total",
    "Unidades vendidas",
    "Data",
];

const CITIES: [&str; 5] = ["São Paulo", "Rio de Janeiro", "Belo Horizonte", "Recife", "Curitiba"];
const STATUSES: [(&str, u64); 3] = [("Pago", 70), ("Pendente", 20), ("Cancelado", 10)];

/// (title, unit price)
const PRODUCTS: [(&str, f64); 6] = [
    ("Camiseta", 49.90),
    ("Caneca", 29.90),
    ("Boné", 39.90),
    ("Mochila", 149.90),
    ("Garrafa térmica", 79.90),
    ("Chaveiro", 9.90),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform integer in `0..n`.
    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len() as u64) as usize]
    }

    /// Pick from `(item, weight)` pairs.
    fn weighted<'a>(&mut self, items: &[(&'a str, u64)]) -> &'a str {
        let total: u64 = items.iter().map(|(_, w)| w).sum();
        let mut roll = self.below(total);
        for (item, weight) in items {
            if roll < *weight {
                return *item;
            }
            roll -= weight;
        }
        items[items.len() - 1].0
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    let output_path = "vendas.xlsx";
    let n_rows = 1000;

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet().set_name("Vendas")?;

    let bold = Format::new().set_bold();
    let money = Format::new().set_num_format("#,##0.00");
    let date_format = Format::new().set_num_format("dd/mm/yyyy");

    for (col, name) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &bold)?;
    }

    // March 2024, one month of sales.
    for row in 1..=n_rows {
        let city = rng.pick(&CITIES);
        let (title, unit_price) = *rng.pick(&PRODUCTS);
        let status = rng.weighted(&STATUSES);
        let units = 1 + rng.below(5);
        let day = 1 + rng.below(31) as u8;
        let total = (unit_price * units as f64 * 100.0).round() / 100.0;
        let date = ExcelDateTime::from_ymd(2024, 3, day).context("building sale date")?;

        sheet.write_string(row, 0, *city)?;
        sheet.write_string(row, 1, title)?;
        sheet.write_string(row, 2, status)?;
        sheet.write_number_with_format(row, 3, total, &money)?;
        sheet.write_number(row, 4, units as f64)?;
        sheet.write_datetime_with_format(row, 5, &date, &date_format)?;
    }

    sheet.autofit();
    workbook
        .save(output_path)
        .with_context(|| format!("writing {output_path}"))?;

    log::info!("Wrote {n_rows} sales to {output_path}");
    println!("Wrote {n_rows} sales to {output_path}");
    Ok(())
}
