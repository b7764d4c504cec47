mod catalog_csv;
