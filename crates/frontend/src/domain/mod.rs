pub mod a025_variation_product;
