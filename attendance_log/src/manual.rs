/*!

This is the long-form manual for `attendance_log` and `attlog`.

## Input formats

Check-ins are exported from a form (Google Forms, Microsoft Forms, ...) as a table with
one row per check-in. The following formats are supported:
* `csv` Comma Separated Values, with a header row
* `xlsx` Excel spreadsheet, the first worksheet unless `worksheetName` is provided

The columns are found by their header. The defaults match the Portuguese form used by
the group:

| Column                        | Content                                     | Required |
|-------------------------------|---------------------------------------------|----------|
| `Data/hora`                   | the time of the check-in                    | yes      |
| `Nome`                        | the name, as typed by the participant       | yes      |
| `COMO CONHECEU O GRUPO?`      | how the participant heard about the group   | no       |
| `PRIMEIRA VEZ NO GRUPO?`      | first visit (free text)                     | no       |
| `DDD+TELEFONE (SEM ESPAÇO)`   | phone number                                | no       |

All the other columns are kept as they are and written back in the export.

### Timestamps

The following layouts are understood:

```text
2024-01-15T19:00:00-03:00    (RFC 3339, the offset is dropped)
2024-01-15 19:00:00          2024-01-15 19:00        2024-01-15T19:00
2024/01/15 19:00:00          15/01/2024 19:00:00     15-01-2024 19:00
2024-01-15                   15/01/2024
```

Slashed dates are always read with the day first. In spreadsheets, date cells are read
directly. Rows with a timestamp that cannot be understood are dropped and reported.

### Names

Names are normalized when they are loaded: extra spaces are removed, each word is
capitalized and the linking particles `da`, `de`, `do`, `das`, `dos` are kept in lowercase
inside a name. For example, `  JOÃO   DA silva ` becomes `João da Silva`.

A blank name is kept as a check-in without a name: it counts in the totals and in the
days, but not in the ranking.

## Corrections

A correction merges all the check-ins of one name into another name, for example
`Joao Silva=>João Silva`. Corrections follow these rules:
- the source name is matched after normalization, so `JOAO  silva` and `Joao Silva` are
  the same source
- a correction is applied to the loaded names only: corrections do not chain. After
  `A=>B` and `B=>C`, the check-ins of `A` are shown as `B`
- correcting the same source twice keeps the last target
- a correction of a name that is not in the data is recorded and reported, but has no
  effect

The original names are never modified. The export contains both the original name
(`Nome_Original`) and the corrected name.

## Configuration

`attlog` comes with sensible defaults, but the same options are often repeated for each
run. The program accepts a configuration file in JSON:

```json
{
  "outputSettings": {
    "title": "Presença no grupo",
    "author": "Secretaria",
    "topN": 10,
    "outputDirectory": "out"
  },
  "inputSource": {
    "provider": "csv",
    "filePath": "presenca.csv",
    "nameColumn": "Nome"
  },
  "filters": {
    "startDate": "2024-01-01",
    "endDate": "2024-03-31",
    "people": []
  },
  "corrections": [
    { "from": "Joao Silva", "to": "João Silva" }
  ]
}
```

All the sections are optional. A relative `filePath` is resolved against the directory
of the configuration file. The options given on the command line take precedence over
the configuration file, and the corrections of the command line are applied after the
ones of the configuration file.

The size of the ranking (`topN`) must be between 5 and 50.

*/
