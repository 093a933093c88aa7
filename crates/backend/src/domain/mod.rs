pub mod a001_monthly_sales;
